//! Fixed-layout output record for the Fortran caller.
//!
//! Fortran reads names from fixed-length character slots, so every name is
//! copied into a byte array of the slot width and padded with blanks. The
//! parallel `arities` array is indexed like `functions`.

use crate::error::TranslateError;
use crate::ir::{FunctionCall, Parameter, TranslationResult};

/// A parameter as the Fortran side sees it: `character(len=3)` name and a
/// two-character identifier with no terminator.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSlot {
    pub name: [u8; Parameter::MAX_NAME_LEN],
    pub identifier: [u8; Parameter::IDENTIFIER_LEN],
}

/// A function-call name in a `character(len=63)` slot.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSlot {
    pub name: [u8; FunctionCall::MAX_NAME_LEN],
}

/// Copies `text` into a blank-padded slot of `N` bytes. Names are limited in
/// characters, so a non-ASCII name can pass that limit and still not fit.
fn pad<const N: usize>(text: &str) -> Result<[u8; N], TranslateError> {
    if text.len() > N {
        return Err(TranslateError::NameTooLong {
            name: text.to_string(),
            max: N,
        });
    }
    let mut slot = [b' '; N];
    slot[..text.len()].copy_from_slice(text.as_bytes());
    Ok(slot)
}

/// Slot contents with the padding removed.
fn unpad(slot: &[u8]) -> String {
    String::from_utf8_lossy(slot).trim_end().to_string()
}

impl ParameterSlot {
    pub fn new(parameter: &Parameter) -> Result<Self, TranslateError> {
        Ok(Self {
            name: pad(&parameter.name)?,
            identifier: pad(&parameter.identifier)?,
        })
    }

    pub fn name(&self) -> String {
        unpad(&self.name)
    }

    pub fn identifier(&self) -> String {
        unpad(&self.identifier)
    }
}

impl FunctionSlot {
    pub fn new(call: &FunctionCall) -> Result<Self, TranslateError> {
        Ok(Self {
            name: pad(&call.name)?,
        })
    }

    pub fn name(&self) -> String {
        unpad(&self.name)
    }
}

/// The complete record handed across the language boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub infix: String,
    pub parameters: Vec<ParameterSlot>,
    pub functions: Vec<FunctionSlot>,
    pub arities: Vec<i32>,
    pub error: i32,
}

impl OutputRecord {
    pub fn from_result(result: &TranslationResult) -> Result<Self, TranslateError> {
        let parameters = result
            .parameters
            .iter()
            .map(ParameterSlot::new)
            .collect::<Result<Vec<_>, _>>()?;
        let functions = result
            .functions
            .iter()
            .map(FunctionSlot::new)
            .collect::<Result<Vec<_>, _>>()?;
        let arities = result
            .functions
            .iter()
            .map(|call| i32::try_from(call.arity).unwrap_or(i32::MAX))
            .collect();

        Ok(Self {
            infix: result.infix.clone(),
            parameters,
            functions,
            arities,
            error: result.status.code(),
        })
    }

    pub fn num_params(&self) -> usize {
        self.parameters.len()
    }

    pub fn num_funcs(&self) -> usize {
        self.functions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ErrorKind;

    #[test]
    fn test_slot_layout() {
        assert_eq!(std::mem::size_of::<ParameterSlot>(), 5);
        assert_eq!(std::mem::size_of::<FunctionSlot>(), 63);
    }

    #[test]
    fn test_parameter_slot_padding() {
        let slot = ParameterSlot::new(&Parameter::new("b").unwrap()).unwrap();
        assert_eq!(&slot.name, b"b  ");
        assert_eq!(&slot.identifier, b"b ");
        assert_eq!(slot.name(), "b");

        let slot = ParameterSlot::new(&Parameter::new("a_0").unwrap()).unwrap();
        assert_eq!(&slot.name, b"a_0");
        assert_eq!(&slot.identifier, b"a0");
    }

    #[test]
    fn test_record_from_result() {
        let result = TranslationResult {
            latex: r"\texttt{f}(x, a)".to_string(),
            infix: "f(x,a)".to_string(),
            parameters: vec![Parameter::new("a").unwrap()],
            functions: vec![FunctionCall::new("f", 2).unwrap()],
            status: ErrorKind::ArityMismatch,
        };
        let record = OutputRecord::from_result(&result).unwrap();
        assert_eq!(record.num_params(), 1);
        assert_eq!(record.num_funcs(), 1);
        assert_eq!(record.functions[0].name(), "f");
        assert_eq!(record.arities, vec![2]);
        assert_eq!(record.error, 2);
    }

    #[test]
    fn test_multibyte_parameter_overflows_slot() {
        let result = crate::translate("2😀");
        assert_eq!(result.status, ErrorKind::None);
        assert!(matches!(
            OutputRecord::from_result(&result),
            Err(TranslateError::NameTooLong { max: 3, .. })
        ));
    }

    #[test]
    fn test_overlong_name_rejected() {
        let call = FunctionCall {
            name: "g".repeat(70),
            arity: 0,
        };
        assert!(matches!(
            FunctionSlot::new(&call),
            Err(TranslateError::NameTooLong { max: 63, .. })
        ));
    }
}
