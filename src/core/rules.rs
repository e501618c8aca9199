//! Recurring auto-debit rules and the scheduler tick.
//!
//! A rule debits a fixed amount from one member's wallet on a daily, weekly,
//! or monthly cadence. [`run_due_wallet_rules`] is one scheduler tick: it
//! executes every active rule whose `next_run_at` has passed, records each
//! outcome in a report for the caller, and advances `next_run_at` to one
//! period past now regardless of outcome. A rule that sat due for several
//! periods therefore fires once and resyncs; missed periods are not billed
//! retroactively.

use crate::{
    config::rules::RulesConfig,
    core::ledger::{DebitRequest, debit_wallet},
    entities::{WalletRule, wallet_rule},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Months, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::str::FromStr;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Cadence of a recurring auto-debit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Every day
    Daily,
    /// Every seven days
    Weekly,
    /// Every calendar month
    Monthly,
}

impl Schedule {
    /// String form stored in the `schedule` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Next execution time, one period past `now`.
    ///
    /// Monthly advancement is calendar-aware: Jan 31 + 1 month lands on the
    /// last day of February.
    #[must_use]
    pub fn advance_from(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Daily => now + Duration::days(1),
            Self::Weekly => now + Duration::days(7),
            Self::Monthly => now + Months::new(1),
        }
    }
}

impl FromStr for Schedule {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(Error::InvalidSchedule {
                value: value.to_string(),
            }),
        }
    }
}

/// Parameters for [`create_wallet_rule`].
#[derive(Debug, Clone)]
pub struct CreateRuleRequest {
    /// Member whose wallet the rule debits
    pub user_id: String,
    /// Positive amount in minor currency units
    pub amount: i64,
    /// Cadence of the rule
    pub schedule: Schedule,
    /// Description carried onto each ledger entry the rule produces
    pub description: String,
    /// Operator creating the rule
    pub created_by: String,
}

/// Outcome of a single rule execution within one scheduler tick.
#[derive(Debug, Clone)]
pub struct RuleRunOutcome {
    /// Rule that was executed
    pub rule_id: i64,
    /// Member the rule debits
    pub user_id: String,
    /// Amount the rule attempted to debit
    pub amount: i64,
    /// Ledger reference minted for this run
    pub reference: String,
    /// Whether the debit completed
    pub completed: bool,
    /// Failure message when the debit was refused
    pub message: Option<String>,
}

/// Result of one scheduler tick over all due rules.
///
/// Advisory reporting only; the durable record of each attempt is the ledger
/// entry the debit already wrote.
#[derive(Debug, Clone)]
pub struct RuleRunReport {
    /// Per-rule outcomes in execution order
    pub outcomes: Vec<RuleRunOutcome>,
    /// Number of rules whose debit completed
    pub completed_count: usize,
    /// Number of rules whose debit was refused
    pub failed_count: usize,
    /// When the tick ran
    pub run_at: DateTime<Utc>,
}

/// Creates a recurring auto-debit rule, first run one period from now.
pub async fn create_wallet_rule(
    db: &DatabaseConnection,
    request: CreateRuleRequest,
) -> Result<wallet_rule::Model> {
    if request.amount <= 0 {
        return Err(Error::InvalidAmount {
            amount: request.amount,
        });
    }

    if request.description.trim().is_empty() {
        return Err(Error::Config {
            message: "Rule description cannot be empty".to_string(),
        });
    }

    let now = Utc::now();
    let rule = wallet_rule::ActiveModel {
        user_id: Set(request.user_id),
        amount: Set(request.amount),
        schedule: Set(request.schedule.as_str().to_string()),
        description: Set(request.description.trim().to_string()),
        next_run_at: Set(request.schedule.advance_from(now)),
        active: Set(true),
        created_by: Set(request.created_by),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    rule.insert(db).await.map_err(Into::into)
}

/// Toggles a rule between active and inactive.
pub async fn set_wallet_rule_active(
    db: &DatabaseConnection,
    rule_id: i64,
    active: bool,
) -> Result<wallet_rule::Model> {
    let rule = WalletRule::find_by_id(rule_id)
        .one(db)
        .await?
        .ok_or(Error::RuleNotFound { id: rule_id })?;

    let mut active_model: wallet_rule::ActiveModel = rule.into();
    active_model.active = Set(active);
    active_model.updated_at = Set(Utc::now());
    active_model.update(db).await.map_err(Into::into)
}

/// Lists rules, newest first, optionally filtered to one member.
pub async fn list_wallet_rules(
    db: &DatabaseConnection,
    user_id: Option<&str>,
) -> Result<Vec<wallet_rule::Model>> {
    let mut query = WalletRule::find();
    if let Some(user_id) = user_id {
        query = query.filter(wallet_rule::Column::UserId.eq(user_id));
    }

    query
        .order_by_desc(wallet_rule::Column::CreatedAt)
        .order_by_desc(wallet_rule::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Executes every active rule whose `next_run_at` has passed. This function:
///
/// 1. Mints a fresh `auto-<rule_id>-<uuid>` reference per rule, so each
///    scheduled execution is its own idempotent ledger attempt
/// 2. Debits the wallet with `source = "auto"`, `created_by = "system"`
/// 3. Captures refused debits per rule; one member's empty wallet never
///    blocks the other due rules
/// 4. Advances `next_run_at` to one period past now, success or failure
///
/// Store errors propagate and abort the tick; the external trigger is
/// expected to retry on its next interval.
#[instrument(skip(db))]
pub async fn run_due_wallet_rules(db: &DatabaseConnection) -> Result<RuleRunReport> {
    let now = Utc::now();
    let due = WalletRule::find()
        .filter(wallet_rule::Column::Active.eq(true))
        .filter(wallet_rule::Column::NextRunAt.lte(now))
        .order_by_asc(wallet_rule::Column::NextRunAt)
        .all(db)
        .await?;

    let mut outcomes = Vec::new();
    let mut completed_count = 0;
    let mut failed_count = 0;

    for rule in due {
        let reference = format!("auto-{}-{}", rule.id, Uuid::new_v4());

        let debit = debit_wallet(
            db,
            DebitRequest {
                user_id: rule.user_id.clone(),
                amount: rule.amount,
                reference: reference.clone(),
                source: "auto".to_string(),
                description: Some(rule.description.clone()),
                metadata: None,
                created_by: Some("system".to_string()),
            },
        )
        .await;

        let outcome = match debit {
            Ok(_) => {
                completed_count += 1;
                RuleRunOutcome {
                    rule_id: rule.id,
                    user_id: rule.user_id.clone(),
                    amount: rule.amount,
                    reference,
                    completed: true,
                    message: None,
                }
            }
            Err(error)
                if matches!(
                    error,
                    Error::InsufficientFunds { .. } | Error::WalletNotFound { .. }
                ) =>
            {
                failed_count += 1;
                warn!("Auto-debit for rule {} refused: {}", rule.id, error);
                RuleRunOutcome {
                    rule_id: rule.id,
                    user_id: rule.user_id.clone(),
                    amount: rule.amount,
                    reference,
                    completed: false,
                    message: Some(error.to_string()),
                }
            }
            Err(error) => return Err(error),
        };
        outcomes.push(outcome);

        // Resync: one period past now, never past the stale next_run_at, so a
        // long-overdue rule fires once instead of replaying its backlog
        let next_run_at = Schedule::from_str(&rule.schedule)?.advance_from(now);
        let mut active_model: wallet_rule::ActiveModel = rule.into();
        active_model.next_run_at = Set(next_run_at);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await?;
    }

    Ok(RuleRunReport {
        outcomes,
        completed_count,
        failed_count,
        run_at: now,
    })
}

/// Creates any configured rule that does not already exist, matching on
/// (member, description). Safe to run on every startup.
pub async fn seed_rules(db: &DatabaseConnection, config: &RulesConfig) -> Result<usize> {
    let mut created = 0;

    for seed in &config.rules {
        let existing = WalletRule::find()
            .filter(wallet_rule::Column::UserId.eq(seed.user_id.as_str()))
            .filter(wallet_rule::Column::Description.eq(seed.description.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            continue;
        }

        let schedule = Schedule::from_str(&seed.schedule)?;
        create_wallet_rule(
            db,
            CreateRuleRequest {
                user_id: seed.user_id.clone(),
                amount: seed.amount,
                schedule,
                description: seed.description.clone(),
                created_by: seed
                    .created_by
                    .clone()
                    .unwrap_or_else(|| "config".to_string()),
            },
        )
        .await?;
        created += 1;
    }

    Ok(created)
}

/// Formats a rule run report into a human-readable summary string.
/// This is what the scheduler daemon logs after each non-empty tick.
#[must_use]
pub fn format_rule_run_summary(report: &RuleRunReport) -> String {
    use std::fmt::Write;

    let mut summary = format!(
        "Wallet rule run - {} - {} due rules\n",
        report.run_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.outcomes.len()
    );

    // write! is infallible when writing to String, so unwrap is safe
    write!(
        summary,
        "  Completed: {} | Failed: {}\n\n",
        report.completed_count, report.failed_count
    )
    .unwrap();

    for outcome in &report.outcomes {
        let status = if outcome.completed {
            "completed"
        } else {
            "failed"
        };

        writeln!(
            summary,
            "  rule {} - {} | {} | amount {}{}",
            outcome.rule_id,
            outcome.user_id,
            status,
            outcome.amount,
            outcome
                .message
                .as_ref()
                .map_or_else(String::new, |message| format!(" ({message})"))
        )
        .unwrap();
    }

    summary
}
