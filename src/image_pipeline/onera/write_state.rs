use crate::image_pipeline::common::error::{OneraError, Result};

/// Tracks whether the header of an output file has been emitted.
///
/// `Unopened -> HeaderPending` when a geometry is assigned for writing,
/// `Unopened | HeaderPending -> HeaderWritten` when the header is written.
/// Nothing leaves `HeaderWritten`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteState {
    #[default]
    Unopened,
    HeaderPending,
    HeaderWritten,
}

impl WriteState {
    pub fn assign_geometry(self) -> Result<Self> {
        match self {
            WriteState::Unopened | WriteState::HeaderPending => Ok(WriteState::HeaderPending),
            WriteState::HeaderWritten => Err(OneraError::InvalidState(
                "geometry cannot change once the header is written".to_string(),
            )),
        }
    }

    pub fn write_header(self) -> Result<Self> {
        match self {
            WriteState::Unopened | WriteState::HeaderPending => Ok(WriteState::HeaderWritten),
            WriteState::HeaderWritten => Err(OneraError::InvalidState(
                "header already written".to_string(),
            )),
        }
    }

    pub fn is_header_written(self) -> bool {
        self == WriteState::HeaderWritten
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_transitions() {
        let state = WriteState::default();
        assert_eq!(state, WriteState::Unopened);

        let state = state.assign_geometry().unwrap();
        assert_eq!(state, WriteState::HeaderPending);
        assert_eq!(state.assign_geometry().unwrap(), WriteState::HeaderPending);

        let state = state.write_header().unwrap();
        assert!(state.is_header_written());
        assert_eq!(WriteState::Unopened.write_header().unwrap(), WriteState::HeaderWritten);
    }

    #[test]
    fn test_no_reentry_after_header() {
        let state = WriteState::HeaderWritten;
        assert!(matches!(state.write_header(), Err(OneraError::InvalidState(_))));
        assert!(matches!(state.assign_geometry(), Err(OneraError::InvalidState(_))));
    }
}
