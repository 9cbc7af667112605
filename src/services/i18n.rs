// src/services/i18n.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Os três idiomas da vitrine. Qualquer outro código cai em português.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Pt,
    En,
    Es,
}

impl Language {
    /// "pt-BR" -> Pt, "en-US" -> En, "es" -> Es, "fr-FR" -> Pt.
    pub fn from_code(code: &str) -> Self {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        match primary.as_str() {
            "en" => Language::En,
            "es" => Language::Es,
            _ => Language::Pt,
        }
    }

    pub fn labels(self) -> &'static OrderLabels {
        match self {
            Language::Pt => &PT,
            Language::En => &EN,
            Language::Es => &ES,
        }
    }

    /// Separadores de milhar e decimal.
    pub fn separators(self) -> (char, char) {
        match self {
            Language::En => (',', '.'),
            Language::Pt | Language::Es => ('.', ','),
        }
    }
}

/// Textos da mensagem de pedido.
#[derive(Debug)]
pub struct OrderLabels {
    pub greeting: &'static str,
    pub order_header: &'static str,
    pub variant: &'static str,
    pub link: &'static str,
    pub quantity: &'static str,
    pub unit_price: &'static str,
    pub subtotal: &'static str,
    pub notes: &'static str,
    pub total: &'static str,
    pub closing: &'static str,
}

static PT: OrderLabels = OrderLabels {
    greeting: "Olá",
    order_header: "NOVO PEDIDO PELA VITRINE",
    variant: "Variação",
    link: "Link do produto",
    quantity: "Quantidade",
    unit_price: "Preço unitário",
    subtotal: "Subtotal",
    notes: "Observações",
    total: "TOTAL",
    closing: "Aguardo a confirmação do pedido. Obrigado!",
};

static EN: OrderLabels = OrderLabels {
    greeting: "Hello",
    order_header: "NEW ORDER FROM THE STOREFRONT",
    variant: "Variant",
    link: "Product link",
    quantity: "Quantity",
    unit_price: "Unit price",
    subtotal: "Subtotal",
    notes: "Notes",
    total: "TOTAL",
    closing: "Looking forward to your confirmation. Thank you!",
};

static ES: OrderLabels = OrderLabels {
    greeting: "Hola",
    order_header: "NUEVO PEDIDO DESDE LA VITRINA",
    variant: "Variante",
    link: "Enlace del producto",
    quantity: "Cantidad",
    unit_price: "Precio unitario",
    subtotal: "Subtotal",
    notes: "Observaciones",
    total: "TOTAL",
    closing: "Quedo a la espera de la confirmación del pedido. ¡Gracias!",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_resolve_with_portuguese_fallback() {
        assert_eq!(Language::from_code("pt-BR"), Language::Pt);
        assert_eq!(Language::from_code("en-US"), Language::En);
        assert_eq!(Language::from_code("EN"), Language::En);
        assert_eq!(Language::from_code("es_ES"), Language::Es);
        assert_eq!(Language::from_code("fr-FR"), Language::Pt);
        assert_eq!(Language::from_code(""), Language::Pt);
    }
}
