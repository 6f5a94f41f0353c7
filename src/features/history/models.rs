use crate::features::subscriptions::Subscription;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 支払い履歴データモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PaymentRecord {
    pub id: String,
    pub user_id: String,
    pub subscription_id: String,
    pub subscription_name: String,
    pub amount: f64,
    pub due_date: NaiveDate, // 支払い対象だった支払日
    pub paid_at: DateTime<Utc>,
}

/// 支払い記録用DTO
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NewPayment {
    pub subscription_id: String,
    pub subscription_name: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub paid_at: DateTime<Utc>,
}

impl NewPayment {
    /// 現在の請求周期の支払いとして作成する
    pub fn for_current_cycle(subscription: &Subscription, paid_at: DateTime<Utc>) -> Self {
        Self {
            subscription_id: subscription.id.clone(),
            subscription_name: subscription.name.clone(),
            amount: subscription.amount,
            due_date: subscription.next_due_date,
            paid_at,
        }
    }

    pub fn into_record(self, id: String, user_id: &str) -> PaymentRecord {
        PaymentRecord {
            id,
            user_id: user_id.to_string(),
            subscription_id: self.subscription_id,
            subscription_name: self.subscription_name,
            amount: self.amount,
            due_date: self.due_date,
            paid_at: self.paid_at,
        }
    }
}

/// 月別の支払い合計
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MonthlyPaymentTotal {
    /// YYYY-MM形式
    pub month: String,
    pub amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_record_serialization() {
        let record = NewPayment {
            subscription_id: "sub-1".to_string(),
            subscription_name: "Netflix".to_string(),
            amount: 15.99,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            paid_at: Utc::now(),
        }
        .into_record("pay-1".to_string(), "user-1");

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"subscription_name\":\"Netflix\""));
        assert!(json.contains("\"due_date\":\"2024-01-15\""));

        let deserialized: PaymentRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, record);
    }
}
