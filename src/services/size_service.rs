// src/services/size_service.rs

use uuid::Uuid;

use crate::{common::error::AppError, db::SizeRepository, models::size::CustomSize};

/// Nome limpo, ou `None` se não sobrar nada.
pub fn normalize_size_name(raw: &str) -> Option<String> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    (!name.is_empty()).then_some(name)
}

/// Comparação sem diferenciar maiúsculas, acentos incluídos ("Único" == "ÚNICO").
pub fn same_size_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[derive(Clone)]
pub struct SizeService {
    repo: SizeRepository,
}

impl SizeService {
    pub fn new(repo: SizeRepository) -> Self {
        Self { repo }
    }

    pub async fn list_custom_sizes(&self, user_id: Uuid) -> Result<Vec<CustomSize>, AppError> {
        self.repo.list(user_id).await
    }

    /// Nome vazio ou repetido (sem diferenciar maiúsculas) não faz nada.
    pub async fn add_custom_size(&self, user_id: Uuid, raw_name: &str) -> Result<Option<CustomSize>, AppError> {
        let Some(name) = normalize_size_name(raw_name) else {
            return Ok(None);
        };

        let existing = self.repo.list(user_id).await?;
        if existing.iter().any(|s| same_size_name(&s.size_name, &name)) {
            return Ok(None);
        }

        self.repo.insert(user_id, &name).await.map(Some)
    }

    pub async fn delete_custom_size(&self, user_id: Uuid, size_id: Uuid) -> Result<(), AppError> {
        if self.repo.delete(user_id, size_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("tamanho".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(normalize_size_name(""), None);
        assert_eq!(normalize_size_name("   \t "), None);
        assert_eq!(normalize_size_name("  Extra   GG "), Some("Extra GG".to_string()));
    }

    #[test]
    fn duplicates_ignore_case_including_accents() {
        assert!(same_size_name("Único", "ÚNICO"));
        assert!(same_size_name("gg", "GG"));
        assert!(!same_size_name("Único", "Unico"));
    }
}
