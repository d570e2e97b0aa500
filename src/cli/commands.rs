use chrono::{DateTime, Utc};

use tally_core::{
    parse_keyword_list, Categorizer, Clock, FixedClock, NewTransaction, RecurrenceEngine,
    RuleService, TransactionService, TransactionStore,
};
use tally_domain::{Displayable, RecurringPattern};

use super::{output, CliContext, TransactionArgs};
use crate::{
    clock::SystemClock,
    errors::Result,
    utils::build_info,
};

pub(super) fn categorize(ctx: &CliContext, description: &str, json: bool) -> Result<()> {
    let classification = Categorizer::categorize(&ctx.store, description, ctx.user_id)?;
    if json {
        output::info(serde_json::to_string(&classification)?);
    } else {
        output::info(classification);
    }
    Ok(())
}

pub(super) fn add_rule(
    ctx: &CliContext,
    keywords: &str,
    category: &str,
    priority: i32,
) -> Result<()> {
    let keywords = parse_keyword_list(keywords);
    let rule = RuleService::add_rule(
        &ctx.store,
        ctx.user_id,
        &keywords,
        category,
        priority,
        SystemClock.now(),
    )?;
    output::success(format!(
        "Rule {} added: [{}] -> {} (priority {})",
        rule.id,
        rule.keywords.join(", "),
        rule.category,
        rule.priority
    ));
    Ok(())
}

pub(super) fn add(ctx: &CliContext, args: TransactionArgs) -> Result<()> {
    let now = SystemClock.now();
    let input = new_transaction(ctx, args, now);
    let transaction = TransactionService::create(&ctx.store, input, now)?;
    output::success(format!(
        "Transaction {} saved: {}",
        transaction.id,
        transaction.display_label()
    ));
    Ok(())
}

pub(super) fn add_recurring(
    ctx: &CliContext,
    args: TransactionArgs,
    pattern: RecurringPattern,
    end: Option<DateTime<Utc>>,
) -> Result<()> {
    let now = SystemClock.now();
    let input = new_transaction(ctx, args, now);
    let definition = TransactionService::create_recurring(
        &ctx.store,
        input,
        pattern,
        end,
        ctx.config.recurrence_span()?,
        now,
    )?;
    let until = definition
        .recurring_end_date
        .map(|end| end.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    output::success(format!(
        "Recurring {} {} saved until {}: {}",
        pattern,
        definition.id,
        until,
        definition.display_label()
    ));
    Ok(())
}

pub(super) fn tick(ctx: &CliContext, now: Option<DateTime<Utc>>) -> Result<()> {
    let engine = RecurrenceEngine::new(ctx.config.due_window()?);
    let report = match now {
        Some(now) => engine.run_tick(&ctx.store, &FixedClock(now))?,
        None => engine.run_tick(&ctx.store, &SystemClock)?,
    };

    output::section("Recurrence tick");
    for instance in &report.created {
        output::info(format!(
            "Created {} for definition {} on {}",
            instance.instance_id,
            instance.definition_id,
            instance.date.format("%Y-%m-%d")
        ));
    }
    for failure in &report.failures {
        output::warning(format!(
            "Definition {} failed: {}",
            failure.definition_id, failure.error
        ));
    }
    output::info(format!(
        "evaluated {}, created {}, not due {}, already present {}, finished {}, failed {}",
        report.evaluated,
        report.created.len(),
        report.not_due,
        report.already_present,
        report.finished,
        report.failures.len()
    ));
    Ok(())
}

pub(super) fn rules(ctx: &CliContext) -> Result<()> {
    let rules = ctx.store.list_rules(ctx.user_id)?;
    if rules.is_empty() {
        output::info("No rules defined.");
        return Ok(());
    }
    for rule in rules {
        let state = if rule.enabled { "on" } else { "off" };
        output::info(format!("{:>4} {:<3} {}", rule.priority, state, rule.display_label()));
    }
    Ok(())
}

pub(super) fn list(ctx: &CliContext, recurring_only: bool) -> Result<()> {
    let mut transactions = ctx.store.list_transactions(ctx.user_id)?;
    if recurring_only {
        transactions.retain(|txn| txn.is_definition());
    }
    if transactions.is_empty() {
        output::info("No transactions recorded.");
        return Ok(());
    }
    if recurring_only {
        for txn in transactions {
            let pattern = txn
                .recurring_pattern
                .map_or("unknown", RecurringPattern::as_str);
            let until = txn
                .recurring_end_date
                .map(|end| end.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            output::info(format!("{pattern:<8} until {until} {}", txn.display_label()));
        }
        return Ok(());
    }
    for txn in transactions {
        let marker = if txn.is_definition() {
            txn.recurring_pattern
                .map_or("recurring", RecurringPattern::as_str)
        } else if txn.is_instance() {
            "instance"
        } else {
            "once"
        };
        output::info(format!("{:<9} {} {}", marker, txn.kind, txn.display_label()));
    }
    Ok(())
}

pub(super) fn version() {
    output::info(build_info::current());
}

fn new_transaction(ctx: &CliContext, args: TransactionArgs, now: DateTime<Utc>) -> NewTransaction {
    let mut input = NewTransaction::new(
        ctx.user_id,
        args.amount,
        args.description,
        args.kind,
        args.date.unwrap_or(now),
    );
    input.category = args.category;
    input.tags = args.tags;
    input.notes = args.notes;
    input
}
