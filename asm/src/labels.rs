//! The label table: identifier -> byte address, case-sensitive, each label
//! defined exactly once.

use std::collections::HashMap;

use crate::error::AssembleError;

#[derive(Debug, Default, Clone)]
pub struct LabelTable {
    addresses: HashMap<String, u16>,
    defined_at: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> LabelTable {
        LabelTable::default()
    }

    /// Enters `label` at `address`, defined on source `line`. Fails if the
    /// label was already defined; duplicate definitions are a first-pass
    /// error.
    pub fn define(&mut self, label: &str, address: u16, line: usize) -> Result<(), AssembleError> {
        if let Some(&first_line) = self.defined_at.get(label) {
            return Err(AssembleError::DuplicateLabel {
                line,
                first_line,
                label: label.to_string(),
            });
        }
        self.addresses.insert(label.to_string(), address);
        self.defined_at.insert(label.to_string(), line);
        Ok(())
    }

    /// Resolves `label` for a reference on source `line`.
    pub fn resolve(&self, label: &str, line: usize) -> Result<u16, AssembleError> {
        self.addresses.get(label).copied().ok_or_else(|| AssembleError::UnknownLabel {
            line,
            label: label.to_string(),
        })
    }

    /// The final table, advisory output for debugging: not embedded in the
    /// code stream.
    pub fn into_map(self) -> HashMap<String, u16> {
        self.addresses
    }
}
