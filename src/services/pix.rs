// src/services/pix.rs

//! Chaves PIX e faixas de comissão por plano.

use std::{fmt, str::FromStr};

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PixKeyType {
    Cpf,
    Cnpj,
    Phone,
    Email,
    Random,
}

impl PixKeyType {
    pub fn as_str(self) -> &'static str {
        match self {
            PixKeyType::Cpf => "cpf",
            PixKeyType::Cnpj => "cnpj",
            PixKeyType::Phone => "phone",
            PixKeyType::Email => "email",
            PixKeyType::Random => "random",
        }
    }
}

impl fmt::Display for PixKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixKeyType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpf" => Ok(PixKeyType::Cpf),
            "cnpj" => Ok(PixKeyType::Cnpj),
            "phone" => Ok(PixKeyType::Phone),
            "email" => Ok(PixKeyType::Email),
            "random" => Ok(PixKeyType::Random),
            other => Err(AppError::Validation(format!("tipo de chave PIX desconhecido: {other}"))),
        }
    }
}

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("regex de e-mail válida"));

static RANDOM_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("regex de chave aleatória válida")
});

const BRAZIL_DDI: &str = "55";

fn digits(key: &str) -> String {
    key.chars().filter(char::is_ascii_digit).collect()
}

/// DDD + número, sem o 55 na frente.
fn national_phone(key: &str) -> Option<String> {
    let d = digits(key);
    let national = match d.len() {
        12 | 13 if d.starts_with(BRAZIL_DDI) => d[BRAZIL_DDI.len()..].to_string(),
        10 | 11 => d,
        _ => return None,
    };
    Some(national)
}

pub fn validate_pix_key(key: &str, key_type: PixKeyType) -> bool {
    let key = key.trim();
    match key_type {
        PixKeyType::Cpf => digits(key).len() == 11,
        PixKeyType::Cnpj => digits(key).len() == 14,
        PixKeyType::Phone => national_phone(key).is_some(),
        PixKeyType::Email => EMAIL_RE.is_match(key),
        PixKeyType::Random => RANDOM_KEY_RE.is_match(key),
    }
}

/// Formata para exibição. Chave inválida volta como veio.
pub fn format_pix_key(key: &str, key_type: PixKeyType) -> String {
    if !validate_pix_key(key, key_type) {
        return key.to_string();
    }

    let key = key.trim();
    match key_type {
        PixKeyType::Cpf => {
            let d = digits(key);
            format!("{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
        }
        PixKeyType::Cnpj => {
            let d = digits(key);
            format!("{}.{}.{}/{}-{}", &d[0..2], &d[2..5], &d[5..8], &d[8..12], &d[12..14])
        }
        PixKeyType::Phone => {
            let Some(n) = national_phone(key) else {
                return key.to_string();
            };
            let (ddd, rest) = n.split_at(2);
            let split = rest.len() - 4;
            format!("+55 ({}) {}-{}", ddd, &rest[..split], &rest[split..])
        }
        PixKeyType::Email | PixKeyType::Random => key.to_lowercase(),
    }
}

// ---
// Comissão por plano
// ---

// Ordem importa: a primeira palavra encontrada define a faixa.
const COMMISSION_TIERS: &[(&str, i64)] = &[("anual", 100), ("semestral", 70), ("trimestral", 50)];

/// Valor fixo de comissão pelo nome do plano. Planos sem faixa rendem zero.
pub fn get_commission_amount(plan_type: &str) -> Decimal {
    let plan = plan_type.to_lowercase();
    COMMISSION_TIERS
        .iter()
        .find(|(keyword, _)| plan.contains(keyword))
        .map(|&(_, amount)| Decimal::new(amount * 100, 2))
        .unwrap_or_else(|| Decimal::new(0, 2))
}
