// src/services/referral_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::referral::{
        CommissionRecord, CommissionStatus, ReferralStats, WithdrawalRecord, WithdrawalRequest,
    },
    services::pix::{format_pix_key, validate_pix_key, PixKeyType},
};

/// De onde vêm as comissões e os saques (o banco, em produção).
#[async_trait]
pub trait ReferralSource: Send + Sync {
    async fn fetch_commissions(&self, user_id: Uuid) -> Result<Vec<CommissionRecord>, AppError>;

    async fn fetch_withdrawals(&self, user_id: Uuid) -> Result<Vec<WithdrawalRecord>, AppError>;

    /// Confere o saldo e grava o pedido numa única unidade atômica.
    ///
    /// Pedidos concorrentes do mesmo usuário são serializados: o segundo só
    /// enxerga o saldo depois que o primeiro foi gravado (ou desistiu).
    async fn reserve_withdrawal(
        &self,
        user_id: Uuid,
        amount: Decimal,
        pix_key: &str,
        pix_key_type: PixKeyType,
    ) -> Result<WithdrawalRequest, AppError>;
}

/// O pedido cabe no saldo disponível?
pub fn ensure_within_balance(amount: Decimal, stats: &ReferralStats) -> Result<(), AppError> {
    if amount > stats.available_for_withdrawal {
        return Err(AppError::Validation(format!(
            "Saldo disponível insuficiente ({}).",
            stats.available_for_withdrawal.round_dp(2)
        )));
    }
    Ok(())
}

/// Dobra os registros nos contadores do painel. Não altera nada.
pub fn aggregate(commissions: &[CommissionRecord], withdrawals: &[WithdrawalRecord]) -> ReferralStats {
    let sum_with = |status: CommissionStatus| -> Decimal {
        commissions
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.amount)
            .sum()
    };

    let pending_commissions = sum_with(CommissionStatus::Pending);
    let paid_commissions = sum_with(CommissionStatus::Paid);

    let reserved: Decimal = withdrawals
        .iter()
        .filter(|w| w.status.reserves_balance())
        .map(|w| w.amount)
        .sum();

    ReferralStats {
        total_referrals: commissions.len() as u32,
        active_referrals: commissions.iter().filter(|c| c.has_active_subscription()).count() as u32,
        total_commissions: commissions.iter().map(|c| c.amount).sum(),
        pending_commissions,
        paid_commissions,
        // Saques acima do pendente nunca deixam o saldo negativo.
        available_for_withdrawal: (pending_commissions - reserved).max(Decimal::ZERO),
    }
}

#[derive(Clone)]
pub struct ReferralService {
    source: Arc<dyn ReferralSource>,
}

impl ReferralService {
    pub fn new(source: impl ReferralSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub async fn try_get_referral_stats(&self, user_id: Uuid) -> Result<ReferralStats, AppError> {
        let (commissions, withdrawals) = tokio::try_join!(
            self.source.fetch_commissions(user_id),
            self.source.fetch_withdrawals(user_id),
        )?;

        Ok(aggregate(&commissions, &withdrawals))
    }

    /// Versão do painel: falha de leitura vira estatística zerada (e log).
    pub async fn get_referral_stats(&self, user_id: Uuid) -> ReferralStats {
        match self.try_get_referral_stats(user_id).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!("🔥 Falha ao carregar estatísticas de indicação de {}: {:?}", user_id, e);
                ReferralStats::default()
            }
        }
    }

    pub async fn request_withdrawal(
        &self,
        user_id: Uuid,
        amount: Decimal,
        pix_key: &str,
        pix_key_type: PixKeyType,
    ) -> Result<WithdrawalRequest, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("O valor do saque deve ser maior que zero.".into()));
        }

        if !validate_pix_key(pix_key, pix_key_type) {
            return Err(AppError::Validation(format!(
                "Chave PIX inválida para o tipo '{pix_key_type}'."
            )));
        }

        // Leitura do saldo e gravação acontecem juntas na fonte;
        // erro de leitura sobe, nunca vira saldo zero.
        let formatted = format_pix_key(pix_key, pix_key_type);
        let request = self
            .source
            .reserve_withdrawal(user_id, amount, &formatted, pix_key_type)
            .await?;

        tracing::info!("💸 Saque de {} solicitado por {}", amount, user_id);
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::referral::WithdrawalStatus;

    fn commission(amount: i64, status: CommissionStatus, sub: Option<&str>) -> CommissionRecord {
        CommissionRecord {
            referrer_id: Uuid::nil(),
            amount: Decimal::from(amount),
            status,
            subscription_status: sub.map(str::to_string),
        }
    }

    fn withdrawal(amount: i64, status: WithdrawalStatus) -> WithdrawalRecord {
        WithdrawalRecord {
            user_id: Uuid::nil(),
            amount: Decimal::from(amount),
            status,
        }
    }

    /// Fonte em memória. O lock cobre leitura + gravação, como a transação do banco.
    #[derive(Default)]
    struct FakeSource {
        commissions: Vec<CommissionRecord>,
        withdrawals: tokio::sync::Mutex<Vec<WithdrawalRecord>>,
        fail: bool,
    }

    impl FakeSource {
        fn new(commissions: Vec<CommissionRecord>, withdrawals: Vec<WithdrawalRecord>) -> Self {
            Self {
                commissions,
                withdrawals: tokio::sync::Mutex::new(withdrawals),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl ReferralSource for FakeSource {
        async fn fetch_commissions(&self, _: Uuid) -> Result<Vec<CommissionRecord>, AppError> {
            if self.fail {
                return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
            }
            Ok(self.commissions.clone())
        }

        async fn fetch_withdrawals(&self, _: Uuid) -> Result<Vec<WithdrawalRecord>, AppError> {
            Ok(self.withdrawals.lock().await.clone())
        }

        async fn reserve_withdrawal(
            &self,
            user_id: Uuid,
            amount: Decimal,
            pix_key: &str,
            pix_key_type: PixKeyType,
        ) -> Result<WithdrawalRequest, AppError> {
            let mut withdrawals = self.withdrawals.lock().await;
            let stats = aggregate(&self.commissions, &withdrawals);
            // Dá a vez a qualquer outro pedido entre a leitura e a gravação.
            tokio::task::yield_now().await;
            ensure_within_balance(amount, &stats)?;

            withdrawals.push(WithdrawalRecord {
                user_id,
                amount,
                status: WithdrawalStatus::Pending,
            });
            Ok(WithdrawalRequest {
                id: Uuid::new_v4(),
                user_id,
                amount,
                pix_key: pix_key.to_string(),
                pix_key_type: pix_key_type.to_string(),
                status: WithdrawalStatus::Pending,
                created_at: None,
            })
        }
    }

    #[test]
    fn aggregate_counts_and_sums() {
        let commissions = vec![
            commission(100, CommissionStatus::Pending, Some("active")),
            commission(70, CommissionStatus::Paid, Some("cancelled")),
            commission(50, CommissionStatus::Pending, None),
        ];
        let withdrawals = vec![
            withdrawal(30, WithdrawalStatus::Pending),
            withdrawal(20, WithdrawalStatus::Approved),
            withdrawal(999, WithdrawalStatus::Rejected),
            withdrawal(999, WithdrawalStatus::Paid),
        ];

        let stats = aggregate(&commissions, &withdrawals);
        assert_eq!(stats.total_referrals, 3);
        assert_eq!(stats.active_referrals, 1);
        assert_eq!(stats.total_commissions, Decimal::from(220));
        assert_eq!(stats.pending_commissions, Decimal::from(150));
        assert_eq!(stats.paid_commissions, Decimal::from(70));
        assert_eq!(stats.available_for_withdrawal, Decimal::from(100));
    }

    #[test]
    fn available_never_goes_negative() {
        let commissions = vec![commission(50, CommissionStatus::Pending, None)];
        for reserved in [50, 51, 1000] {
            let stats = aggregate(&commissions, &[withdrawal(reserved, WithdrawalStatus::Pending)]);
            assert_eq!(stats.available_for_withdrawal, Decimal::ZERO);
        }
        let stats = aggregate(&[], &[withdrawal(10, WithdrawalStatus::Approved)]);
        assert_eq!(stats.available_for_withdrawal, Decimal::ZERO);
    }

    #[tokio::test]
    async fn fetch_failure_yields_zeroed_stats() {
        let service = ReferralService::new(FakeSource {
            fail: true,
            ..FakeSource::new(vec![commission(100, CommissionStatus::Pending, Some("active"))], vec![])
        });

        assert_eq!(service.get_referral_stats(Uuid::nil()).await, ReferralStats::default());
        assert!(service.try_get_referral_stats(Uuid::nil()).await.is_err());
    }

    #[tokio::test]
    async fn withdrawal_is_limited_by_the_available_balance() {
        let service = ReferralService::new(FakeSource::new(
            vec![commission(100, CommissionStatus::Pending, Some("active"))],
            vec![withdrawal(40, WithdrawalStatus::Pending)],
        ));
        let user = Uuid::new_v4();

        let too_much = service
            .request_withdrawal(user, Decimal::from(61), "12345678900", PixKeyType::Cpf)
            .await;
        assert!(matches!(too_much, Err(AppError::Validation(_))));

        let bad_key = service
            .request_withdrawal(user, Decimal::from(10), "abc", PixKeyType::Email)
            .await;
        assert!(matches!(bad_key, Err(AppError::Validation(_))));

        let zero = service
            .request_withdrawal(user, Decimal::ZERO, "12345678900", PixKeyType::Cpf)
            .await;
        assert!(matches!(zero, Err(AppError::Validation(_))));

        let ok = service
            .request_withdrawal(user, Decimal::from(60), "12345678900", PixKeyType::Cpf)
            .await
            .unwrap();
        assert_eq!(ok.pix_key, "123.456.789-00");
        assert_eq!(ok.status, WithdrawalStatus::Pending);
    }

    #[tokio::test]
    async fn concurrent_withdrawals_cannot_overdraw() {
        let service = ReferralService::new(FakeSource::new(
            vec![commission(100, CommissionStatus::Pending, Some("active"))],
            vec![],
        ));
        let user = Uuid::new_v4();

        let (a, b) = tokio::join!(
            service.request_withdrawal(user, Decimal::from(100), "12345678900", PixKeyType::Cpf),
            service.request_withdrawal(user, Decimal::from(100), "12345678900", PixKeyType::Cpf),
        );

        assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
        let stats = service.try_get_referral_stats(user).await.unwrap();
        assert_eq!(stats.available_for_withdrawal, Decimal::ZERO);
    }

    #[test]
    fn balance_check_allows_the_exact_amount() {
        let stats = ReferralStats {
            available_for_withdrawal: Decimal::from(60),
            ..Default::default()
        };
        assert!(ensure_within_balance(Decimal::from(60), &stats).is_ok());
        assert!(matches!(
            ensure_within_balance(Decimal::new(6001, 2), &stats),
            Err(AppError::Validation(_))
        ));
    }
}
