//! Pure derivations from a flat list of entries to chart-ready series.
//!
//! Nothing in here performs I/O or fails: an empty entry list yields empty or
//! zero-valued results, and every percentage with a zero denominator is 0.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::entry::Entry;
use crate::period::{Month, Period};

/// The configured shape of the dashboard: known funds and the visible grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub funds: Vec<String>,
    pub years: Vec<i32>,
    pub months: Vec<Month>,
}

impl Settings {
    pub fn new(funds: Vec<String>, years: Vec<i32>) -> Settings {
        Settings {
            funds,
            years: sorted_years(&years),
            months: Month::all().to_vec(),
        }
    }

    /// Every configured period in chronological order.
    pub fn grid(&self) -> Vec<Period> {
        sorted_years(&self.years)
            .into_iter()
            .flat_map(|year| self.months.iter().map(move |&m| Period::new(year, m)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub invested: f64,
    pub current: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    pub period: Period,
    pub invested_cumulative: f64,
    pub last_known_current_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyProfit {
    /// The month the growth is attributed to: one before the observation.
    pub period: Period,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundAmount {
    pub fund: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundReturn {
    pub fund: String,
    pub invested: f64,
    pub latest_current: f64,
    pub returns_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundProfit {
    pub fund: String,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyProfit {
    pub year: i32,
    pub funds: Vec<FundProfit>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearInvestment {
    pub year: i32,
    pub total: f64,
    pub funds: Vec<FundAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodAmount {
    pub period: Period,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundGrowthPoint {
    pub period: Period,
    pub funds: Vec<FundAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    pub period: Period,
    pub invested: f64,
    pub current: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// Inclusive lower bounds, evaluated top-down. Anything below the last bound
/// is `Poor`.
const HEALTH_THRESHOLDS: [(f64, HealthStatus); 3] = [
    (15.0, HealthStatus::Excellent),
    (5.0, HealthStatus::Good),
    (0.0, HealthStatus::Fair),
];

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Excellent => "Excellent",
            HealthStatus::Good => "Good",
            HealthStatus::Fair => "Fair",
            HealthStatus::Poor => "Poor",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            HealthStatus::Excellent => "#10b981",
            HealthStatus::Good => "#3b82f6",
            HealthStatus::Fair => "#f59e0b",
            HealthStatus::Poor => "#ef4444",
        }
    }
}

fn sorted_years(years: &[i32]) -> Vec<i32> {
    let mut years = years.to_vec();
    years.sort_unstable();
    years.dedup();
    years
}

fn sum_by<F: Fn(&Entry) -> f64>(entries: &[&Entry], f: F) -> f64 {
    entries.iter().map(|e| f(*e)).sum()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ratio as a percentage; zero when the denominator is zero.
pub fn percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator * 100.0
    }
}

/// Known funds first, in configured order, then names discovered in the
/// entries in order of first appearance.
pub fn fund_set(entries: &[Entry], known: &[String]) -> Vec<String> {
    let mut funds: Vec<String> = Vec::new();
    let names = known
        .iter()
        .map(String::as_str)
        .chain(entries.iter().map(Entry::get_fund_name));
    for name in names {
        if !funds.iter().any(|f| f == name) {
            funds.push(name.to_string());
        }
    }
    funds
}

pub fn period_totals(entries: &[Entry]) -> BTreeMap<Period, PeriodTotals> {
    let mut totals: BTreeMap<Period, PeriodTotals> = BTreeMap::new();
    for entry in entries {
        let bucket = totals.entry(entry.period()).or_default();
        bucket.invested += entry.get_invested();
        bucket.current += entry.get_current();
    }
    totals
}

/// Entries grouped per fund, each group in chronological order. Entries that
/// share a period keep their input order.
fn entries_by_fund(entries: &[Entry]) -> HashMap<&str, Vec<&Entry>> {
    let mut grouped: HashMap<&str, Vec<&Entry>> = HashMap::new();
    for entry in entries {
        grouped.entry(entry.get_fund_name()).or_default().push(entry);
    }
    for group in grouped.values_mut() {
        group.sort_by_key(|e| e.period());
    }
    grouped
}

pub fn compute_timeline(entries: &[Entry], years: &[i32], months: &[Month]) -> Vec<Period> {
    let years = sorted_years(years);
    let (Some(&first_year), Some(&first_month)) = (years.first(), months.first()) else {
        return Vec::new();
    };

    let earliest = entries
        .iter()
        .filter(|e| years.contains(&e.period().year))
        .map(Entry::period)
        .min()
        .unwrap_or(Period::new(first_year, first_month));

    let mut timeline = Vec::new();
    for &year in years.iter().filter(|&&y| y >= earliest.year) {
        for &month in months {
            if year == earliest.year && month.index() < earliest.month.index() {
                continue;
            }
            timeline.push(Period::new(year, month));
        }
    }
    timeline
}

pub fn compute_cumulative_growth(entries: &[Entry], timeline: &[Period]) -> Vec<GrowthPoint> {
    let totals = period_totals(entries);
    let mut invested_cumulative = 0.0;
    let mut last_known_current_value = 0.0;

    timeline
        .iter()
        .map(|period| {
            let month = totals.get(period).copied().unwrap_or_default();
            invested_cumulative += month.invested;
            if month.current > 0.0 {
                last_known_current_value = month.current;
            }
            GrowthPoint {
                period: *period,
                invested_cumulative,
                last_known_current_value,
            }
        })
        .collect()
}

/// Profit between consecutive observed periods, reported against the month
/// before the observation. Includes zero-profit records.
pub fn compute_monthly_profit(entries: &[Entry]) -> Vec<MonthlyProfit> {
    let mut last_current = 0.0;
    period_totals(entries)
        .into_iter()
        .map(|(period, totals)| {
            let profit = totals.current - last_current - totals.invested;
            last_current = totals.current;
            MonthlyProfit {
                period: period.predecessor(),
                profit,
            }
        })
        .collect()
}

pub fn compute_allocation(entries: &[Entry], funds: &[String]) -> Vec<FundAmount> {
    funds
        .iter()
        .map(|fund| FundAmount {
            fund: fund.clone(),
            amount: entries
                .iter()
                .filter(|e| e.get_fund_name() == fund)
                .map(Entry::get_invested)
                .sum(),
        })
        .filter(|slice| slice.amount > 0.0)
        .collect()
}

pub fn compute_returns(entries: &[Entry], funds: &[String]) -> Vec<FundReturn> {
    let grouped = entries_by_fund(entries);
    funds
        .iter()
        .filter_map(|fund| {
            let fund_entries = grouped.get(fund.as_str())?;
            let latest = fund_entries.last()?;
            let invested = sum_by(fund_entries, Entry::get_invested);
            if invested == 0.0 {
                return None;
            }
            let returns_percent = round2(percent(latest.get_current() - invested, invested));
            if returns_percent == 0.0 {
                return None;
            }
            Some(FundReturn {
                fund: fund.clone(),
                invested,
                latest_current: latest.get_current(),
                returns_percent,
            })
        })
        .collect()
}

/// Profit per fund per year. A year only reports profit once the following
/// year has an observation for that fund; otherwise it stays at zero.
pub fn compute_yearly_profit_by_fund(
    entries: &[Entry],
    funds: &[String],
    years: &[i32],
) -> Vec<YearlyProfit> {
    let grouped = entries_by_fund(entries);
    sorted_years(years)
        .into_iter()
        .map(|year| {
            let funds: Vec<FundProfit> = funds
                .iter()
                .map(|fund| {
                    let fund_entries: &[&Entry] =
                        grouped.get(fund.as_str()).map(Vec::as_slice).unwrap_or(&[]);
                    FundProfit {
                        fund: fund.clone(),
                        profit: fund_year_profit(fund_entries, year),
                    }
                })
                .collect();
            let total = funds.iter().map(|f| f.profit).sum();
            YearlyProfit { year, funds, total }
        })
        .collect()
}

fn fund_year_profit(fund_entries: &[&Entry], year: i32) -> f64 {
    let Some(first_next) = fund_entries.iter().find(|e| e.period().year == year + 1) else {
        return 0.0;
    };
    let starting = fund_entries
        .iter()
        .filter(|e| e.period().year == year - 1)
        .last()
        .map(|e| e.get_current())
        .unwrap_or(0.0);
    let ending = first_next.get_current() - first_next.get_invested();
    let invested: f64 = fund_entries
        .iter()
        .filter(|e| e.period().year == year)
        .map(|e| e.get_invested())
        .sum();
    ending - starting - invested
}

pub fn compute_health_classification(profit_loss_percent: f64) -> HealthStatus {
    HEALTH_THRESHOLDS
        .iter()
        .find(|(bound, _)| profit_loss_percent >= *bound)
        .map(|(_, status)| *status)
        .unwrap_or(HealthStatus::Poor)
}

/// Invested and current sums for every configured period, zero where nothing
/// was recorded. Periods outside the grid that carry data are included too so
/// the totals always add up to the overall invested amount.
pub fn compute_month_totals(entries: &[Entry], years: &[i32], months: &[Month]) -> Vec<MonthTotal> {
    let mut totals: BTreeMap<Period, PeriodTotals> = sorted_years(years)
        .into_iter()
        .flat_map(|year| months.iter().map(move |&m| Period::new(year, m)))
        .map(|period| (period, PeriodTotals::default()))
        .collect();
    for (period, observed) in period_totals(entries) {
        let bucket = totals.entry(period).or_default();
        bucket.invested += observed.invested;
        bucket.current += observed.current;
    }
    totals
        .into_iter()
        .map(|(period, t)| MonthTotal {
            period,
            invested: t.invested,
            current: t.current,
        })
        .collect()
}

/// Non-cumulative invested amount for each period of the timeline.
pub fn compute_monthly_investment_trend(entries: &[Entry], timeline: &[Period]) -> Vec<PeriodAmount> {
    let totals = period_totals(entries);
    timeline
        .iter()
        .map(|period| PeriodAmount {
            period: *period,
            amount: totals.get(period).map(|t| t.invested).unwrap_or(0.0),
        })
        .collect()
}

/// Forward-filled current value of every fund along the timeline.
pub fn compute_fund_growth(entries: &[Entry], timeline: &[Period], funds: &[String]) -> Vec<FundGrowthPoint> {
    let mut observed: HashMap<(&str, Period), f64> = HashMap::new();
    for entry in entries {
        *observed
            .entry((entry.get_fund_name(), entry.period()))
            .or_insert(0.0) += entry.get_current();
    }

    let mut last_known: Vec<f64> = vec![0.0; funds.len()];
    timeline
        .iter()
        .map(|period| {
            let funds = funds
                .iter()
                .zip(last_known.iter_mut())
                .map(|(fund, last)| {
                    if let Some(&value) = observed.get(&(fund.as_str(), *period)) {
                        if value > 0.0 {
                            *last = value;
                        }
                    }
                    FundAmount {
                        fund: fund.clone(),
                        amount: *last,
                    }
                })
                .collect();
            FundGrowthPoint {
                period: *period,
                funds,
            }
        })
        .collect()
}

pub fn compute_year_wise_investment(entries: &[Entry], funds: &[String], years: &[i32]) -> Vec<YearInvestment> {
    sorted_years(years)
        .into_iter()
        .map(|year| {
            let in_year: Vec<&Entry> = entries.iter().filter(|e| e.period().year == year).collect();
            let funds: Vec<FundAmount> = funds
                .iter()
                .map(|fund| FundAmount {
                    fund: fund.clone(),
                    amount: in_year
                        .iter()
                        .filter(|e| e.get_fund_name() == fund)
                        .map(|e| e.get_invested())
                        .sum(),
                })
                .filter(|f| f.amount > 0.0)
                .collect();
            YearInvestment {
                year,
                total: sum_by(&in_year, Entry::get_invested),
                funds,
            }
        })
        .collect()
}
