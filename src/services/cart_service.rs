// src/services/cart_service.rs

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    common::error::AppError,
    models::cart::{CartItem, CartStats},
    services::i18n::Language,
};

const SEPARATOR: &str = "------------------------------";

/// Origem usada nos links de produto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    canonical_origin: String,
    production_hosts: Vec<String>,
}

impl LinkConfig {
    pub fn new<'a>(canonical_origin: &str, production_hosts: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            canonical_origin: canonical_origin.trim().trim_end_matches('/').to_string(),
            production_hosts: production_hosts
                .into_iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Hosts de produção viram a origem canônica; o resto usa a origem da requisição.
    pub fn resolve(&self, request_origin: Option<&str>) -> String {
        let Some(origin) = request_origin.map(str::trim).filter(|o| !o.is_empty()) else {
            return self.canonical_origin.clone();
        };

        let host = origin
            .split_once("://")
            .map_or(origin, |(_, rest)| rest)
            .split(['/', ':'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        if self.production_hosts.iter().any(|h| *h == host) {
            self.canonical_origin.clone()
        } else {
            origin.trim_end_matches('/').to_string()
        }
    }
}

/// Quantidade total e valor total. Estouro numérico é erro de validação.
pub fn calculate_cart_stats(items: &[CartItem]) -> Result<CartStats, AppError> {
    items.iter().try_fold(
        CartStats {
            item_count: 0,
            total: Decimal::ZERO,
        },
        |acc, item| {
            let item_count = acc.item_count.checked_add(item.quantity);
            let total = item
                .checked_subtotal()
                .and_then(|subtotal| acc.total.checked_add(subtotal));

            match (item_count, total) {
                (Some(item_count), Some(total)) => Ok(CartStats { item_count, total }),
                _ => Err(AppError::Validation(
                    "O carrinho excede os limites de quantidade ou valor.".into(),
                )),
            }
        },
    )
}

fn currency_symbol(currency: &str) -> (String, bool) {
    match currency.trim().to_ascii_uppercase().as_str() {
        "BRL" => ("R$".to_string(), true),
        "USD" => ("$".to_string(), true),
        "EUR" => ("€".to_string(), true),
        code => (code.to_string(), false),
    }
}

/// Valor com duas casas, símbolo e separadores do idioma.
pub fn format_money(amount: Decimal, currency: &str, lang: Language) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let plain = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let (thousands, decimal) = lang.separators();
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(thousands);
        }
        grouped.push(ch);
    }

    let (symbol, is_symbol) = currency_symbol(currency);
    let space = if lang == Language::En && is_symbol { "" } else { " " };
    let sign = if negative { "-" } else { "" };

    format!("{sign}{symbol}{space}{grouped}{decimal}{frac_part}")
}

pub fn product_link(link_base: &str, slug: &str, product_id: &str) -> String {
    format!("{}/{}/produto/{}", link_base.trim_end_matches('/'), slug, product_id)
}

/// Texto do pedido para enviar ao vendedor. Mesmas entradas, mesmo texto.
pub fn generate_cart_order_message(
    items: &[CartItem],
    total: Decimal,
    seller_name: &str,
    slug: &str,
    currency: &str,
    language: &str,
    link_base: &str,
) -> String {
    let lang = Language::from_code(language);
    let l = lang.labels();
    let money = |value: Decimal| format_money(value, currency, lang);

    let mut lines: Vec<String> = vec![
        format!("{} {}!", l.greeting, seller_name.trim()),
        String::new(),
        format!("*{}*", l.order_header),
        String::new(),
    ];

    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }

        lines.push(format!("*{}. {}*", index + 1, item.title.trim()));

        let variant: Vec<&str> = [&item.selected_color, &item.selected_size]
            .into_iter()
            .filter_map(|v| v.as_deref().map(str::trim).filter(|v| !v.is_empty()))
            .collect();
        if !variant.is_empty() {
            lines.push(format!("{}: {}", l.variant, variant.join(" / ")));
        }

        lines.push(format!("{}: {}", l.link, product_link(link_base, slug, &item.id)));
        lines.push(format!("{}: {}", l.quantity, item.quantity));
        lines.push(format!("{}: {}", l.unit_price, money(item.effective_price())));
        lines.push(format!("{}: {}", l.subtotal, money(item.subtotal())));

        if let Some(notes) = item.notes.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            lines.push(format!("{}: {}", l.notes, notes));
        }
    }

    lines.push(SEPARATOR.to_string());
    lines.push(format!("*{}: {}*", l.total, money(total)));
    lines.push(String::new());
    lines.push(l.closing.to_string());

    lines.join("\n")
}

/// Link `wa.me` com a mensagem pré-preenchida. Números sem DDI ganham o 55.
pub fn whatsapp_link(phone: &str, message: &str) -> Option<String> {
    let mut digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    if matches!(digits.len(), 10 | 11) {
        digits.insert_str(0, "55");
    }
    Some(format!("https://wa.me/{}?text={}", digits, urlencoding::encode(message)))
}
