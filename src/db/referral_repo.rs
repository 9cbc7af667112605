// src/db/referral_repo.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::referral::{CommissionRecord, WithdrawalRecord, WithdrawalRequest},
    services::{
        pix::PixKeyType,
        referral_service::{aggregate, ensure_within_balance, ReferralSource},
    },
};

// Comissões do indicador, com o status da assinatura que as gerou
const COMMISSIONS_SQL: &str = r#"
    SELECT
        rc.referrer_id,
        rc.amount,
        rc.status,
        s.status AS subscription_status
    FROM referral_commissions rc
    LEFT JOIN subscriptions s ON s.id = rc.subscription_id
    WHERE rc.referrer_id = $1
"#;

const WITHDRAWALS_SQL: &str =
    "SELECT user_id, amount, status FROM withdrawal_requests WHERE user_id = $1";

#[derive(Clone)]
pub struct ReferralRepository {
    pool: PgPool,
}

impl ReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn commissions<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<CommissionRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, CommissionRecord>(COMMISSIONS_SQL)
            .bind(user_id)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }

    async fn withdrawals<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<WithdrawalRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, WithdrawalRecord>(WITHDRAWALS_SQL)
            .bind(user_id)
            .fetch_all(executor)
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl ReferralSource for ReferralRepository {
    async fn fetch_commissions(&self, user_id: Uuid) -> Result<Vec<CommissionRecord>, AppError> {
        Self::commissions(&self.pool, user_id).await
    }

    async fn fetch_withdrawals(&self, user_id: Uuid) -> Result<Vec<WithdrawalRecord>, AppError> {
        Self::withdrawals(&self.pool, user_id).await
    }

    async fn reserve_withdrawal(
        &self,
        user_id: Uuid,
        amount: Decimal,
        pix_key: &str,
        pix_key_type: PixKeyType,
    ) -> Result<WithdrawalRequest, AppError> {
        // 1. Transação: qualquer erro abaixo faz rollback no drop
        let mut tx = self.pool.begin().await?;

        // 2. Um pedido por usuário de cada vez, até o commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        // 3. Saldo lido dentro da mesma transação
        let commissions = Self::commissions(&mut *tx, user_id).await?;
        let withdrawals = Self::withdrawals(&mut *tx, user_id).await?;
        ensure_within_balance(amount, &aggregate(&commissions, &withdrawals))?;

        // 4. Todo pedido nasce 'pending'; aprovação e pagamento são do admin
        let request = sqlx::query_as::<_, WithdrawalRequest>(
            r#"
            INSERT INTO withdrawal_requests (user_id, amount, pix_key, pix_key_type, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, user_id, amount, pix_key, pix_key_type, status, created_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(pix_key)
        .bind(pix_key_type.as_str())
        .fetch_one(&mut *tx)
        .await?;

        // 5. Salva tudo (e libera o lock)
        tx.commit().await?;

        Ok(request)
    }
}
