// src/models/cart.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Teto de uma linha do carrinho.
pub const MAX_QUANTITY: u32 = 10_000;
/// Maior preço unitário aceito (R$ 100 milhões).
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);
pub const MAX_CART_LINES: u64 = 500;

fn validate_price(val: &Decimal) -> Result<(), ValidationError> {
    let message = if val.is_sign_negative() {
        "O valor não pode ser negativo."
    } else if *val > MAX_UNIT_PRICE {
        "O valor excede o máximo permitido."
    } else {
        return Ok(());
    };

    let mut err = ValidationError::new("range");
    err.message = Some(message.into());
    Err(err)
}

/// Uma linha do carrinho.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    #[validate(length(min = 1, message = "O id do produto é obrigatório."))]
    #[schema(example = "8f14e45f-ceea-467f-a0e6-2b6c1d3c5a10")]
    pub id: String,

    #[validate(length(min = 1, message = "O título é obrigatório."))]
    #[schema(example = "Vestido Floral")]
    pub title: String,

    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = f64, example = 100.0)]
    pub price: Decimal,

    #[validate(custom(function = "validate_price"))]
    #[schema(value_type = Option<f64>, example = 80.0)]
    pub discounted_price: Option<Decimal>,

    #[validate(range(min = 1, max = MAX_QUANTITY, message = "A quantidade deve ficar entre 1 e 10000."))]
    #[schema(example = 2)]
    pub quantity: u32,

    pub selected_color: Option<String>,
    pub selected_size: Option<String>,
    pub notes: Option<String>,
}

impl CartItem {
    /// O preço promocional só vale quando é menor que o cheio.
    pub fn effective_price(&self) -> Decimal {
        match self.discounted_price {
            Some(discounted) if discounted < self.price => discounted,
            _ => self.price,
        }
    }

    /// `None` se o produto estourar o `Decimal`.
    pub fn checked_subtotal(&self) -> Option<Decimal> {
        self.effective_price().checked_mul(Decimal::from(self.quantity))
    }

    /// Versão para exibição: satura em vez de falhar.
    pub fn subtotal(&self) -> Decimal {
        self.effective_price().saturating_mul(Decimal::from(self.quantity))
    }

    /// Mesma linha = mesmo produto com a mesma cor e tamanho.
    pub fn same_line(&self, other: &CartItem) -> bool {
        self.id == other.id
            && self.selected_color == other.selected_color
            && self.selected_size == other.selected_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartStats {
    pub item_count: u32,
    #[schema(value_type = f64)]
    pub total: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderMessagePayload {
    #[validate(
        length(min = 1, max = MAX_CART_LINES, message = "O carrinho deve ter entre 1 e 500 itens."),
        nested
    )]
    pub items: Vec<CartItem>,

    /// Sobrepõe o idioma configurado na vitrine.
    #[schema(example = "en-US")]
    pub language: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderMessageResponse {
    pub item_count: u32,
    #[schema(value_type = f64)]
    pub total: Decimal,
    pub message: String,
    pub whatsapp_url: Option<String>,
}
