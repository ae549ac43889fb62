use crate::errors::DashError;

pub struct QueryBuilder;

impl QueryBuilder {
    /// Build the fixed, parameterless full-table read.
    pub fn build_select_all(project: &str, dataset: &str, table: &str) -> Result<String, DashError> {
        for (kind, ident) in [("project", project), ("dataset", dataset), ("table", table)] {
            if !is_valid_identifier(ident) {
                return Err(DashError::Config(format!("invalid {} identifier: {:?}", kind, ident)));
            }
        }
        Ok(format!("SELECT * FROM `{}.{}.{}`", project, dataset, table))
    }

    pub fn build_health_query() -> String {
        "SELECT 1".to_string()
    }
}

// Project ids may contain dashes; dataset and table names never need quoting beyond backticks.
fn is_valid_identifier(ident: &str) -> bool {
    !ident.is_empty()
        && ident
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_select_all() {
        let query =
            QueryBuilder::build_select_all("escolap2p", "cliente_packbrasil", "sih_icsap_pack_demo")
                .unwrap();
        assert_eq!(
            query,
            "SELECT * FROM `escolap2p.cliente_packbrasil.sih_icsap_pack_demo`"
        );
    }

    #[test]
    fn test_rejects_injection() {
        assert!(QueryBuilder::build_select_all("p", "d", "t` WHERE 1=1 --").is_err());
        assert!(QueryBuilder::build_select_all("", "d", "t").is_err());
    }
}
