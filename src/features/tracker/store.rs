use crate::features::history::PaymentHistoryStore;
use crate::features::notifications::NotificationStore;
use crate::features::subscriptions::SubscriptionStore;
use crate::features::users::UserStore;

/// トラッカーが必要とする永続化ストアの集合
pub trait TrackerStore: SubscriptionStore + PaymentHistoryStore + NotificationStore + UserStore {}

impl<T> TrackerStore for T where
    T: SubscriptionStore + PaymentHistoryStore + NotificationStore + UserStore
{
}
