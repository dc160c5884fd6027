//! The method view over the linked tables.
//!
//! Every `MethodDef` row becomes a [`Method`]: an [`InternalMethod`] when
//! the row carries an RVA (the body lives in this image), an
//! [`ExternalMethod`] otherwise (abstract, runtime-provided, or forwarded
//! through P/Invoke). Parameters are wired up from the row's `Param`
//! run-list, and just enough of the `MethodDefSig` blob is interpreted to
//! expose the calling convention, the arity, and the return element kind.
//! Full signature interpretation is out of scope here.

use crate::{
    file::parser::Parser,
    metadata::{
        diagnostics::{DiagnosticContext, DiagnosticSink},
        tables::{LinkedTables, MethodAttributes, MethodImplAttributes, ParamAttributes, TableId},
        token::Token,
    },
    Result,
};

/// Calling conventions a `MethodDefSig` can carry (low nibble of the
/// leading byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConvention {
    /// The default managed convention.
    Default,
    /// Unmanaged `cdecl`.
    C,
    /// Unmanaged `stdcall`.
    StdCall,
    /// Unmanaged `thiscall`.
    ThisCall,
    /// Unmanaged `fastcall`.
    FastCall,
    /// Managed variable-argument convention.
    VarArg,
    /// A convention value outside the defined set.
    Other(u8),
}

impl CallingConvention {
    fn from_bits(bits: u8) -> CallingConvention {
        match bits & 0x0F {
            0x00 => CallingConvention::Default,
            0x01 => CallingConvention::C,
            0x02 => CallingConvention::StdCall,
            0x03 => CallingConvention::ThisCall,
            0x04 => CallingConvention::FastCall,
            0x05 => CallingConvention::VarArg,
            other => CallingConvention::Other(other),
        }
    }
}

/// The element kind of a return type, from the first element byte of the
/// signature's return-type term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `void`
    Void,
    /// `bool`
    Boolean,
    /// `char`
    Char,
    /// `i8`
    I1,
    /// `u8`
    U1,
    /// `i16`
    I2,
    /// `u16`
    U2,
    /// `i32`
    I4,
    /// `u32`
    U4,
    /// `i64`
    I8,
    /// `u64`
    U8,
    /// `f32`
    R4,
    /// `f64`
    R8,
    /// `System.String`
    String,
    /// Unmanaged pointer.
    Ptr,
    /// Managed by-reference.
    ByRef,
    /// A value type, named by a following token.
    ValueType,
    /// A class type, named by a following token.
    Class,
    /// A generic type parameter.
    Var,
    /// A multi-dimensional array.
    Array,
    /// An instantiated generic type.
    GenericInst,
    /// `System.TypedReference`
    TypedByRef,
    /// Native `isize`.
    I,
    /// Native `usize`.
    U,
    /// A function pointer.
    FnPtr,
    /// `System.Object`
    Object,
    /// A single-dimensional array.
    SzArray,
    /// A generic method parameter.
    MVar,
    /// Any other element value.
    Other(u8),
}

impl ElementKind {
    fn from_byte(byte: u8) -> ElementKind {
        match byte {
            0x01 => ElementKind::Void,
            0x02 => ElementKind::Boolean,
            0x03 => ElementKind::Char,
            0x04 => ElementKind::I1,
            0x05 => ElementKind::U1,
            0x06 => ElementKind::I2,
            0x07 => ElementKind::U2,
            0x08 => ElementKind::I4,
            0x09 => ElementKind::U4,
            0x0A => ElementKind::I8,
            0x0B => ElementKind::U8,
            0x0C => ElementKind::R4,
            0x0D => ElementKind::R8,
            0x0E => ElementKind::String,
            0x0F => ElementKind::Ptr,
            0x10 => ElementKind::ByRef,
            0x11 => ElementKind::ValueType,
            0x12 => ElementKind::Class,
            0x13 => ElementKind::Var,
            0x14 => ElementKind::Array,
            0x15 => ElementKind::GenericInst,
            0x16 => ElementKind::TypedByRef,
            0x18 => ElementKind::I,
            0x19 => ElementKind::U,
            0x1B => ElementKind::FnPtr,
            0x1C => ElementKind::Object,
            0x1D => ElementKind::SzArray,
            0x1E => ElementKind::MVar,
            other => ElementKind::Other(other),
        }
    }
}

/// The interpreted head of a `MethodDefSig` blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Whether the signature carries `HASTHIS`.
    pub has_this: bool,
    /// Whether the signature carries `EXPLICITTHIS`.
    pub explicit_this: bool,
    /// The calling convention.
    pub calling_convention: CallingConvention,
    /// Number of generic parameters, zero for non-generic methods.
    pub generic_param_count: u32,
    /// Declared parameter count.
    pub param_count: u32,
    /// Element kind of the return type.
    pub return_type: ElementKind,
}

impl MethodSignature {
    /// Interpret the head of a `MethodDefSig` blob (ECMA-335 II.23.2.1).
    pub fn parse(blob: &[u8]) -> Result<MethodSignature> {
        let mut parser = Parser::new(blob);

        let head = parser.read_le::<u8>()?;
        let has_this = head & 0x20 != 0;
        let explicit_this = head & 0x40 != 0;
        let generic = head & 0x10 != 0;

        let generic_param_count = if generic {
            parser.read_compressed_uint()?
        } else {
            0
        };
        let param_count = parser.read_compressed_uint()?;

        // The return-type term may start with custom-modifier pairs;
        // skip them to reach the element byte.
        let mut element = parser.read_le::<u8>()?;
        while element == 0x1F || element == 0x20 {
            let _ = parser.read_compressed_uint()?;
            element = parser.read_le::<u8>()?;
        }

        Ok(MethodSignature {
            has_this,
            explicit_this,
            calling_convention: CallingConvention::from_bits(head),
            generic_param_count,
            param_count,
            return_type: ElementKind::from_byte(element),
        })
    }
}

/// One parameter of a method, from the `Param` run.
#[derive(Debug, Clone)]
pub struct MethodParam {
    /// Parameter position; zero names the return value.
    pub sequence: u16,
    /// Parameter name.
    pub name: Option<String>,
    /// Parameter attributes.
    pub flags: ParamAttributes,
}

/// A method whose body lives in this image.
#[derive(Debug, Clone)]
pub struct InternalMethod {
    /// Metadata token of the defining `MethodDef` row.
    pub token: Token,
    /// Method name.
    pub name: Option<String>,
    /// RVA of the method body.
    pub rva: u32,
    /// Method attributes.
    pub flags: MethodAttributes,
    /// Implementation attributes.
    pub impl_flags: MethodImplAttributes,
    /// Interpreted signature head, absent when the blob is unreadable.
    pub signature: Option<MethodSignature>,
    /// Parameters in sequence order.
    pub params: Vec<MethodParam>,
}

/// A method defined here but implemented elsewhere (abstract, runtime or
/// P/Invoke).
#[derive(Debug, Clone)]
pub struct ExternalMethod {
    /// Metadata token of the defining `MethodDef` row.
    pub token: Token,
    /// Method name.
    pub name: Option<String>,
    /// Method attributes.
    pub flags: MethodAttributes,
    /// Implementation attributes.
    pub impl_flags: MethodImplAttributes,
    /// Interpreted signature head, absent when the blob is unreadable.
    pub signature: Option<MethodSignature>,
    /// Parameters in sequence order.
    pub params: Vec<MethodParam>,
}

/// A method of the image.
#[derive(Debug, Clone)]
pub enum Method {
    /// The body lives in this image.
    Internal(InternalMethod),
    /// The body lives elsewhere.
    External(ExternalMethod),
}

impl Method {
    /// Metadata token of the defining row.
    #[must_use]
    pub fn token(&self) -> Token {
        match self {
            Method::Internal(method) => method.token,
            Method::External(method) => method.token,
        }
    }

    /// Method name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Method::Internal(method) => method.name.as_deref(),
            Method::External(method) => method.name.as_deref(),
        }
    }

    /// Parameters in sequence order.
    #[must_use]
    pub fn params(&self) -> &[MethodParam] {
        match self {
            Method::Internal(method) => &method.params,
            Method::External(method) => &method.params,
        }
    }
}

/// Build the method list from the linked tables.
pub(crate) fn build_methods(tables: &LinkedTables, sink: &dyn DiagnosticSink) -> Vec<Method> {
    let mut methods = Vec::with_capacity(tables.method_def.len());

    for row in tables.method_def.rows() {
        let params = row
            .params
            .iter()
            .filter_map(|reference| tables.param.get(reference.row))
            .map(|param| MethodParam {
                sequence: param.sequence,
                name: param.name.clone(),
                flags: param.flags,
            })
            .collect();

        let signature = match &row.signature {
            Some(blob) if !blob.is_empty() => match MethodSignature::parse(blob) {
                Ok(signature) => Some(signature),
                Err(error) => {
                    sink.warn(
                        format!("method signature unreadable: {error}"),
                        DiagnosticContext::at_row(TableId::MethodDef, row.rid),
                    );
                    None
                }
            },
            _ => None,
        };

        let method = if row.rva != 0 {
            Method::Internal(InternalMethod {
                token: row.token,
                name: row.name.clone(),
                rva: row.rva,
                flags: row.flags,
                impl_flags: row.impl_flags,
                signature,
                params,
            })
        } else {
            Method::External(ExternalMethod {
                token: row.token,
                name: row.name.clone(),
                flags: row.flags,
                impl_flags: row.impl_flags,
                signature,
                params,
            })
        };

        methods.push(method);
    }

    methods
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_head() {
        // HASTHIS | default, one param, returns void.
        let blob = [0x20, 0x01, 0x01, 0x0E];
        let signature = MethodSignature::parse(&blob).unwrap();

        assert!(signature.has_this);
        assert!(!signature.explicit_this);
        assert_eq!(signature.calling_convention, CallingConvention::Default);
        assert_eq!(signature.generic_param_count, 0);
        assert_eq!(signature.param_count, 1);
        assert_eq!(signature.return_type, ElementKind::Void);
    }

    #[test]
    fn generic_signature_head() {
        // GENERIC, two type params, no params, returns i32.
        let blob = [0x10, 0x02, 0x00, 0x08];
        let signature = MethodSignature::parse(&blob).unwrap();

        assert_eq!(signature.generic_param_count, 2);
        assert_eq!(signature.param_count, 0);
        assert_eq!(signature.return_type, ElementKind::I4);
    }

    #[test]
    fn custom_modifiers_are_skipped() {
        // CMOD_REQD + token, then string return.
        let blob = [0x00, 0x00, 0x1F, 0x11, 0x0E];
        let signature = MethodSignature::parse(&blob).unwrap();
        assert_eq!(signature.return_type, ElementKind::String);
    }

    #[test]
    fn truncated_signature() {
        assert!(MethodSignature::parse(&[0x20]).is_err());
        assert!(MethodSignature::parse(&[]).is_err());
    }
}
