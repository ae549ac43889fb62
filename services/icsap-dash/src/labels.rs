use serde::{Deserialize, Serialize};
use svckit::errors::DashError;
use svckit::types::IcsapFlag;

/// Display labels for the two ICSAP flag literals. Lookups work both ways.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagLabels {
    pub icsap: String,
    pub non_icsap: String,
}

impl Default for FlagLabels {
    fn default() -> Self {
        Self {
            icsap: "ICSAP".to_string(),
            non_icsap: "Não-ICSAP".to_string(),
        }
    }
}

impl FlagLabels {
    pub fn display(&self, flag: IcsapFlag) -> &str {
        match flag {
            IcsapFlag::Icsap => &self.icsap,
            IcsapFlag::NonIcsap => &self.non_icsap,
        }
    }

    /// Accepts either a display label or the raw source literal.
    pub fn flag_for(&self, label: &str) -> Option<IcsapFlag> {
        let label = label.trim();
        if label == self.icsap {
            Some(IcsapFlag::Icsap)
        } else if label == self.non_icsap {
            Some(IcsapFlag::NonIcsap)
        } else {
            IcsapFlag::parse(label)
        }
    }

    pub fn validate(&self) -> Result<(), DashError> {
        if self.icsap.trim().is_empty() || self.non_icsap.trim().is_empty() {
            return Err(DashError::Config("flag labels must not be empty".to_string()));
        }
        if self.icsap == self.non_icsap {
            return Err(DashError::Config(format!(
                "flag labels must differ, both are {:?}",
                self.icsap
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_labels() {
        let labels = FlagLabels::default();
        for flag in IcsapFlag::ALL {
            assert_eq!(labels.flag_for(labels.display(flag)), Some(flag));
        }
    }

    #[test]
    fn test_raw_literals_resolve() {
        let labels = FlagLabels::default();
        assert_eq!(labels.flag_for("Sim"), Some(IcsapFlag::Icsap));
        assert_eq!(labels.flag_for("Não"), Some(IcsapFlag::NonIcsap));
        assert_eq!(labels.flag_for("Talvez"), None);
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let labels = FlagLabels {
            icsap: "X".into(),
            non_icsap: "X".into(),
        };
        assert!(labels.validate().is_err());
        assert!(FlagLabels::default().validate().is_ok());
    }
}
