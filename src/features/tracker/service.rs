use super::store::TrackerStore;
use crate::features::analytics::{
    self, BudgetInsights, DueStatus, SavingsOpportunities, SpendingSummary,
};
use crate::features::history::{MonthlyPaymentTotal, NewPayment, PaymentRecord};
use crate::features::notifications::{self, NewNotification, Notification};
use crate::features::subscriptions::{
    mark_paid_changes, Category, CreateSubscriptionDto, NewSubscription, Subscription,
    SubscriptionForm, UpdateSubscriptionDto,
};
use crate::features::users::{
    validate_budget, CreateUserDto, NotificationPreferences, UserProfile,
};
use crate::shared::config::TrackerConfig;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{local_date, non_empty, normalize_string, parse_timezone};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::collections::BTreeMap;

/// 1ユーザー分のサブスクリプションを保持する状態コンテナ
///
/// すべての変更はストアの応答を待ってからメモリ上の状態に反映する。
/// ストアが失敗した場合はエラーを返し、メモリ上の状態は変更しない。
pub struct SubscriptionTracker<S: TrackerStore> {
    store: S,
    user_id: String,
    default_timezone: Tz,
    default_currency: String,
    due_soon_days: i64,
    subscriptions: Vec<Subscription>,
    user: Option<UserProfile>,
    payments: Vec<PaymentRecord>,
    notifications: Vec<Notification>,
}

impl<S: TrackerStore> SubscriptionTracker<S> {
    /// 空のトラッカーを作成する（ストアからの読み込みは `load` で行う）
    ///
    /// # 引数
    /// * `store` - 永続化ストア
    /// * `config` - トラッカー設定
    ///
    /// # 戻り値
    /// トラッカー、または既定タイムゾーンが不正な場合は設定エラー
    pub fn new(store: S, config: &TrackerConfig) -> AppResult<Self> {
        let default_timezone = parse_timezone(&config.default_timezone).map_err(|_| {
            AppError::configuration(format!(
                "既定のタイムゾーンが不正です: {}",
                config.default_timezone
            ))
        })?;

        Ok(Self {
            store,
            user_id: config.user_id.clone(),
            default_timezone,
            default_currency: config.default_currency.clone(),
            due_soon_days: config.due_soon_days,
            subscriptions: Vec::new(),
            user: None,
            payments: Vec::new(),
            notifications: Vec::new(),
        })
    }

    /// ストアから全状態を読み込む
    ///
    /// 途中で失敗した場合は何も反映しない。
    pub fn load(&mut self) -> AppResult<()> {
        let subscriptions = self.store.list(&self.user_id)?;
        let user = self.store.find_user(&self.user_id)?;
        let payments = self.store.list_payments(&self.user_id)?;
        let notifications = self.store.list_notifications(&self.user_id)?;

        log::info!(
            "トラッカーを読み込みました: user_id={}, subscriptions={}, payments={}, notifications={}",
            self.user_id,
            subscriptions.len(),
            payments.len(),
            notifications.len()
        );

        self.subscriptions = subscriptions;
        self.user = user;
        self.payments = payments;
        self.notifications = notifications;
        Ok(())
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// 保持しているサブスクリプション（登録順）
    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// 支払い履歴（新しい順）
    pub fn payment_history(&self) -> &[PaymentRecord] {
        &self.payments
    }

    /// 通知（新しい順）
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// 日付計算に使うタイムゾーン（ユーザー設定が不正・未設定の場合は既定値）
    pub fn timezone(&self) -> Tz {
        self.user
            .as_ref()
            .and_then(|user| user.tz().ok())
            .unwrap_or(self.default_timezone)
    }

    /// ユーザーのタイムゾーンでの今日
    pub fn today(&self) -> NaiveDate {
        self.today_at(Utc::now())
    }

    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        local_date(now, self.timezone())
    }

    fn position(&self, id: &str) -> AppResult<usize> {
        self.subscriptions
            .iter()
            .position(|subscription| subscription.id == id)
            .ok_or_else(|| {
                AppError::NotFound(format!("ID {id} のサブスクリプションが見つかりません"))
            })
    }

    // ---- サブスクリプションの変更 ----

    /// サブスクリプションを作成する
    ///
    /// 次回支払日が未指定の場合は開始日から1周期進めた日付になる。
    pub fn create(&mut self, dto: CreateSubscriptionDto) -> AppResult<Subscription> {
        dto.validate()?;

        let next_due_date = match dto.next_due_date {
            Some(date) => date,
            None => dto.recurrence.advance(dto.start_date)?,
        };

        let new_subscription = NewSubscription {
            name: normalize_string(&dto.name),
            amount: dto.amount,
            category: dto.category,
            recurrence: dto.recurrence,
            next_due_date,
            start_date: dto.start_date,
            created_at: Utc::now(),
            is_paid: false,
            description: non_empty(dto.description),
            notes: non_empty(dto.notes),
            is_free_trial: dto.is_free_trial,
            trial_end_date: dto.trial_end_date,
            auto_renew: dto.auto_renew,
            reminder_days: dto.reminder_days,
        };

        let created = self.store.create(&self.user_id, new_subscription)?;
        self.subscriptions.push(created.clone());
        Ok(created)
    }

    /// 入力フォームの値からサブスクリプションを作成する（開始日は今日）
    pub fn create_from_form(&mut self, form: SubscriptionForm) -> AppResult<Subscription> {
        let dto = form.into_create_dto(self.today())?;
        self.create(dto)
    }

    /// サブスクリプションを部分更新する
    ///
    /// 金額が変わる場合、前回金額が明示されていなければ変更前の金額を記録する。
    pub fn update(&mut self, id: &str, changes: UpdateSubscriptionDto) -> AppResult<Subscription> {
        changes.validate()?;
        let index = self.position(id)?;

        let mut changes = changes;
        let current = &self.subscriptions[index];
        if let Some(amount) = changes.amount {
            if amount != current.amount && changes.previous_amount.is_none() {
                changes.previous_amount = Some(current.amount);
            }
        }

        if changes.is_empty() {
            return Ok(current.clone());
        }

        // 適用後のレコードで組み合わせの整合性を確認してから書き込む
        let mut preview = current.clone();
        preview.apply(&changes, Utc::now());
        preview.validate()?;

        let updated = self.store.update(id, &changes)?;
        self.subscriptions[index] = updated.clone();
        log::info!("サブスクリプションを更新しました: id={id}");
        Ok(updated)
    }

    /// 入力フォームの値でサブスクリプションを更新する
    pub fn update_from_form(&mut self, id: &str, form: SubscriptionForm) -> AppResult<Subscription> {
        let changes = form.into_update_dto()?;
        self.update(id, changes)
    }

    /// サブスクリプションを削除する
    pub fn delete(&mut self, id: &str) -> AppResult<()> {
        let index = self.position(id)?;
        self.store.delete(id)?;
        self.subscriptions.remove(index);
        Ok(())
    }

    /// 支払い済みとして記録する
    ///
    /// 次回支払日を1周期進めて未払いに戻し、支払い履歴を追加する。
    pub fn mark_paid(&mut self, id: &str) -> AppResult<PaymentRecord> {
        let index = self.position(id)?;
        let subscription = &self.subscriptions[index];

        let changes = mark_paid_changes(subscription)?;
        let payment = NewPayment::for_current_cycle(subscription, Utc::now());

        let (updated, record) = self
            .store
            .record_payment(&self.user_id, &changes, payment)?;

        log::debug!(
            "次の請求周期に進めました: id={id}, next_due_date={}",
            updated.next_due_date
        );
        self.subscriptions[index] = updated;
        self.payments.insert(0, record.clone());
        Ok(record)
    }

    // ---- ユーザー（予算コンテキスト） ----

    /// セッションのユーザーを登録する
    pub fn register_user(&mut self, dto: CreateUserDto) -> AppResult<&UserProfile> {
        dto.validate()?;
        let default_timezone = self.default_timezone.name().to_string();
        let user = self.store.create_user(
            &self.user_id,
            dto,
            &self.default_currency,
            &default_timezone,
        )?;
        Ok(&*self.user.insert(user))
    }

    /// 月額予算を更新する
    pub fn update_budget(&mut self, monthly_budget: f64) -> AppResult<&UserProfile> {
        validate_budget(monthly_budget)?;
        if self.user.is_none() {
            return Err(AppError::not_found("ユーザー"));
        }
        let user = self.store.update_budget(&self.user_id, monthly_budget)?;
        Ok(&*self.user.insert(user))
    }

    /// 通知設定を更新する
    pub fn update_notification_preferences(
        &mut self,
        preferences: NotificationPreferences,
    ) -> AppResult<&UserProfile> {
        if self.user.is_none() {
            return Err(AppError::not_found("ユーザー"));
        }
        let user = self
            .store
            .update_preferences(&self.user_id, &preferences)?;
        Ok(&*self.user.insert(user))
    }

    fn monthly_budget(&self) -> Option<f64> {
        self.user.as_ref().map(|user| user.monthly_budget)
    }

    // ---- 分析 ----

    pub fn total_monthly_amount(&self) -> f64 {
        analytics::total_monthly_amount(&self.subscriptions)
    }

    pub fn spending_by_category(&self) -> BTreeMap<Category, f64> {
        analytics::spending_by_category(&self.subscriptions)
    }

    /// 支払日の昇順（同日は登録順）
    pub fn upcoming_bills(&self) -> Vec<&Subscription> {
        analytics::upcoming_bills(&self.subscriptions)
    }

    /// 今日からn日以内に支払日が来る請求
    pub fn bills_due_within(&self, days: i64) -> Vec<&Subscription> {
        analytics::bills_due_within(&self.subscriptions, self.today(), days)
    }

    /// 残り日数が設定の日数未満の請求（今日が支払日のものを含む）
    pub fn due_soon(&self) -> Vec<&Subscription> {
        analytics::bills_due_soon(&self.subscriptions, self.today(), self.due_soon_days)
    }

    pub fn due_status(&self, id: &str) -> AppResult<DueStatus> {
        let index = self.position(id)?;
        Ok(DueStatus::classify(
            self.subscriptions[index].next_due_date,
            self.today(),
        ))
    }

    pub fn budget_insights(&self) -> BudgetInsights {
        analytics::budget_insights(self.total_monthly_amount(), self.monthly_budget())
    }

    pub fn savings_opportunities(&self) -> SavingsOpportunities {
        self.savings_opportunities_at(Utc::now())
    }

    pub fn savings_opportunities_at(&self, now: DateTime<Utc>) -> SavingsOpportunities {
        analytics::savings_opportunities(&self.subscriptions, self.today_at(now), now)
    }

    pub fn active_free_trials(&self) -> Vec<&Subscription> {
        analytics::active_free_trials(&self.subscriptions)
    }

    pub fn spending_summary(&self) -> SpendingSummary {
        analytics::spending_summary(&self.subscriptions, self.monthly_budget())
    }

    /// 直近nか月の月別支払い合計（古い順）
    pub fn monthly_payment_trend(&self, months: u32) -> Vec<MonthlyPaymentTotal> {
        analytics::monthly_payment_trend(&self.payments, self.today(), months, self.timezone())
    }

    // ---- 通知 ----

    /// 通知イベントを生成して保存する
    ///
    /// 既存の通知との重複チェックは行わない。
    pub fn scan_notifications(&mut self) -> AppResult<Vec<Notification>> {
        self.scan_notifications_at(Utc::now())
    }

    pub fn scan_notifications_at(&mut self, now: DateTime<Utc>) -> AppResult<Vec<Notification>> {
        let events = self.generate_notifications(now);

        let mut saved = Vec::with_capacity(events.len());
        let mut failure = None;
        for event in events {
            match self.store.save_notification(&self.user_id, event) {
                Ok(notification) => saved.push(notification),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        // 保存済みの分だけメモリに反映する
        let mut notifications = saved.clone();
        notifications.append(&mut self.notifications);
        self.notifications = notifications;

        match failure {
            Some(e) => {
                log::error!(
                    "通知の保存に失敗しました: saved={}, error={e}",
                    saved.len()
                );
                Err(e)
            }
            None => {
                log::info!("通知を生成しました: count={}", saved.len());
                Ok(saved)
            }
        }
    }

    fn generate_notifications(&self, now: DateTime<Utc>) -> Vec<NewNotification> {
        let today = self.today_at(now);
        let preferences = self
            .user
            .as_ref()
            .map(|user| user.notification_preferences.clone())
            .unwrap_or_default();
        let subscriptions = &self.subscriptions;

        let mut events = notifications::check_for_due_reminders(
            subscriptions,
            &preferences.reminder_days,
            today,
            now,
        );
        if preferences.price_increase_alerts {
            events.extend(notifications::check_for_price_increases(subscriptions, now));
        }
        if preferences.trial_end_alerts {
            events.extend(notifications::check_for_trial_ending(subscriptions, today, now));
        }
        if preferences.overdue_alerts {
            events.extend(notifications::check_for_overdue(subscriptions, today, now));
        }
        if self.user.is_some() {
            events.extend(notifications::check_for_budget_alert(&self.budget_insights(), now));
        }
        events
    }

    /// 通知を既読にする
    pub fn mark_notification_as_read(&mut self, id: &str) -> AppResult<()> {
        let index = self
            .notifications
            .iter()
            .position(|notification| notification.id == id)
            .ok_or_else(|| AppError::NotFound(format!("ID {id} の通知が見つかりません")))?;

        let updated = self.store.mark_notification_read(id)?;
        self.notifications[index] = updated;
        Ok(())
    }

    pub fn unread_notification_count(&self) -> usize {
        self.notifications
            .iter()
            .filter(|notification| !notification.is_read)
            .count()
    }
}
