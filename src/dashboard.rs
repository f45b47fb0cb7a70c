use colored::Colorize;
use comfy_table::{
    presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color as TColor, ContentArrangement, Table,
};
use piechart::{Chart, Color};
use serde::Serialize;

use crate::aggregate::{
    compute_allocation, compute_cumulative_growth, compute_fund_growth,
    compute_health_classification, compute_month_totals, compute_monthly_investment_trend,
    compute_monthly_profit, compute_returns, compute_timeline, compute_year_wise_investment,
    compute_yearly_profit_by_fund, fund_set, percent, period_totals, FundAmount, FundGrowthPoint,
    FundReturn, GrowthPoint, HealthStatus, MonthTotal, MonthlyProfit, PeriodAmount, Settings,
    YearInvestment, YearlyProfit,
};
use crate::entry::Entry;
use crate::format::{format_currency, format_percent};
use crate::period::{Month, Period};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_invested: f64,
    pub total_current: f64,
    pub profit_loss: f64,
    pub profit_loss_percent: f64,
    pub health_status: HealthStatus,
    /// Sum of every monthly profit record, zero-profit months included.
    pub monthly_profit_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundRow {
    pub fund: String,
    /// Invested amount per configured period, `None` where nothing was recorded.
    pub cells: Vec<Option<f64>>,
}

/// Fund by month grid of invested amounts with a month-total footer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentTable {
    pub periods: Vec<Period>,
    pub rows: Vec<FundRow>,
    pub month_totals: Vec<f64>,
    pub overall_total: f64,
}

impl InvestmentTable {
    fn build(entries: &[Entry], funds: &[String], settings: &Settings) -> InvestmentTable {
        let periods = settings.grid();
        let totals = period_totals(entries);

        let rows = funds
            .iter()
            .map(|fund| FundRow {
                fund: fund.clone(),
                cells: periods
                    .iter()
                    .map(|period| {
                        let matching: Vec<f64> = entries
                            .iter()
                            .filter(|e| e.get_fund_name() == fund && e.period() == *period)
                            .map(Entry::get_invested)
                            .collect();
                        if matching.is_empty() {
                            None
                        } else {
                            Some(matching.iter().sum())
                        }
                    })
                    .collect(),
            })
            .collect();

        let month_totals = periods
            .iter()
            .map(|period| totals.get(period).map(|t| t.invested).unwrap_or(0.0))
            .collect();

        InvestmentTable {
            periods,
            rows,
            month_totals,
            overall_total: entries.iter().map(Entry::get_invested).sum(),
        }
    }
}

/// Every view-model the dashboard renders, derived from one entry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub timeline: Vec<Period>,
    pub cumulative_growth: Vec<GrowthPoint>,
    /// Chart series: zero-profit months are left out.
    pub monthly_profit: Vec<MonthlyProfit>,
    pub allocation: Vec<FundAmount>,
    pub monthly_investment_trend: Vec<PeriodAmount>,
    pub sip_wise_growth: Vec<FundGrowthPoint>,
    pub returns_comparison: Vec<FundReturn>,
    pub year_wise_investment: Vec<YearInvestment>,
    pub yearly_profit_by_fund: Vec<YearlyProfit>,
    pub month_totals: Vec<MonthTotal>,
    pub investment_table: InvestmentTable,
    pub summary: Summary,
}

impl Dashboard {
    /// Recomputes everything from scratch. This is the single entry point
    /// renderers use; it never fails and never touches `entries`.
    pub fn compute(entries: &[Entry], settings: &Settings) -> Dashboard {
        let funds = fund_set(entries, &settings.funds);
        let timeline = compute_timeline(entries, &settings.years, &settings.months);
        let cumulative_growth = compute_cumulative_growth(entries, &timeline);
        let all_profit = compute_monthly_profit(entries);

        let total_invested: f64 = entries.iter().map(Entry::get_invested).sum();
        let total_current = cumulative_growth
            .last()
            .map(|g| g.last_known_current_value)
            .unwrap_or(0.0);
        let profit_loss = total_current - total_invested;
        let profit_loss_percent = percent(profit_loss, total_invested);

        let summary = Summary {
            total_invested,
            total_current,
            profit_loss,
            profit_loss_percent,
            health_status: compute_health_classification(profit_loss_percent),
            monthly_profit_total: all_profit.iter().map(|p| p.profit).sum(),
        };

        Dashboard {
            monthly_investment_trend: compute_monthly_investment_trend(entries, &timeline),
            sip_wise_growth: compute_fund_growth(entries, &timeline, &funds),
            monthly_profit: all_profit.into_iter().filter(|p| p.profit != 0.0).collect(),
            allocation: compute_allocation(entries, &funds),
            returns_comparison: compute_returns(entries, &funds),
            year_wise_investment: compute_year_wise_investment(entries, &funds, &settings.years),
            yearly_profit_by_fund: compute_yearly_profit_by_fund(entries, &funds, &settings.years),
            month_totals: compute_month_totals(entries, &settings.years, &settings.months),
            investment_table: InvestmentTable::build(entries, &funds, settings),
            timeline,
            cumulative_growth,
            summary,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn print_summary(&self, currency: &str) {
        let s = &self.summary;
        let status = s.health_status;
        let label = match status {
            HealthStatus::Excellent => status.label().green().bold(),
            HealthStatus::Good => status.label().blue().bold(),
            HealthStatus::Fair => status.label().yellow().bold(),
            HealthStatus::Poor => status.label().red().bold(),
        };

        let mut table = new_table(80);
        table.set_header(header(&["Invested", "Current", "P/L", "%", "Health"]));
        table.add_row(vec![
            money_cell(s.total_invested, currency),
            money_cell(s.total_current, currency),
            signed_money_cell(s.profit_loss, currency),
            pct_cell(s.profit_loss_percent),
            Cell::new(status.label()).fg(health_color(status)),
        ]);
        println!("{table}");
        println!("Portfolio health: {label}");
    }

    pub fn print_growth(&self, currency: &str) {
        let mut table = new_table(80);
        table.set_header(header(&["Month", "Invested (month)", "Invested (total)", "Current value"]));
        for (point, flow) in self.cumulative_growth.iter().zip(&self.monthly_investment_trend) {
            table.add_row(vec![
                Cell::new(point.period.label()),
                money_cell(flow.amount, currency),
                money_cell(point.invested_cumulative, currency),
                money_cell(point.last_known_current_value, currency),
            ]);
        }
        println!("{table}");
    }

    pub fn print_profit(&self, currency: &str) {
        let mut table = new_table(60);
        table.set_header(header(&["Month", "Profit"]));
        for record in &self.monthly_profit {
            table.add_row(vec![
                Cell::new(record.period.label()),
                signed_money_cell(record.profit, currency),
            ]);
        }
        table.add_row(vec![
            Cell::new("TOTAL").add_attribute(Attribute::Bold),
            signed_money_cell(self.summary.monthly_profit_total, currency).add_attribute(Attribute::Bold),
        ]);
        println!("{table}");
    }

    // Print the allocation in descending order of invested amount
    pub fn print_allocation(&self, currency: &str) {
        let mut allocation: Vec<&FundAmount> = self.allocation.iter().collect();
        allocation.sort_by(|a, b| b.amount.total_cmp(&a.amount));

        let mut table = new_table(80);
        table.set_header(header(&["Fund", "Invested", "Share"]));
        for slice in allocation {
            table.add_row(vec![
                Cell::new(&slice.fund),
                money_cell(slice.amount, currency),
                Cell::new(format!(
                    "{:.2}%",
                    percent(slice.amount, self.summary.total_invested)
                ))
                .set_alignment(CellAlignment::Right),
            ]);
        }
        println!("{table}");
    }

    pub fn draw_pie_chart(&self) {
        let colors = [
            Color::Red,
            Color::Green,
            Color::Blue,
            Color::Yellow,
            Color::Cyan,
            Color::White,
            Color::Purple,
        ];

        let data: Vec<piechart::Data> = self
            .allocation
            .iter()
            .enumerate()
            .map(|(i, slice)| piechart::Data {
                label: slice.fund.clone(),
                value: slice.amount as f32,
                color: Some(colors[i % colors.len()].into()),
                fill: '•',
            })
            .collect();

        if data.is_empty() {
            println!("No investments recorded yet.");
            return;
        }

        Chart::new()
            .legend(true)
            .radius(9)
            .aspect_ratio(3)
            .draw(&data);
    }

    pub fn print_returns(&self, currency: &str) {
        let mut table = new_table(90);
        table.set_header(header(&["Fund", "Invested", "Latest value", "Returns"]));
        for fund in &self.returns_comparison {
            table.add_row(vec![
                Cell::new(&fund.fund),
                money_cell(fund.invested, currency),
                money_cell(fund.latest_current, currency),
                pct_cell(fund.returns_percent),
            ]);
        }
        println!("{table}");
    }

    pub fn print_yearly(&self, currency: &str) {
        let mut invested = new_table(80);
        invested.set_header(header(&["Year", "Invested", "Funds"]));
        for year in &self.year_wise_investment {
            let split = year
                .funds
                .iter()
                .map(|f| format!("{}: {}", f.fund, format_currency(f.amount, currency)))
                .collect::<Vec<_>>()
                .join("\n");
            invested.add_row(vec![
                Cell::new(year.year),
                money_cell(year.total, currency),
                Cell::new(split),
            ]);
        }

        let mut profit = new_table(100);
        let mut columns = vec!["Year".to_string()];
        if let Some(first) = self.yearly_profit_by_fund.first() {
            columns.extend(first.funds.iter().map(|f| f.fund.clone()));
        }
        columns.push("Total".to_string());
        profit.set_header(
            columns
                .iter()
                .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
        for year in &self.yearly_profit_by_fund {
            let mut row = vec![Cell::new(year.year)];
            row.extend(year.funds.iter().map(|f| signed_money_cell(f.profit, currency)));
            row.push(signed_money_cell(year.total, currency).add_attribute(Attribute::Bold));
            profit.add_row(row);
        }

        println!("{invested}");
        println!("{profit}");
    }

    /// Investment details, one table per configured year.
    pub fn print_table(&self, currency: &str) {
        let table_data = &self.investment_table;
        for (year_index, periods) in table_data.periods.chunks(Month::all().len()).enumerate() {
            let offset = year_index * Month::all().len();
            let Some(first) = periods.first() else {
                continue;
            };

            let mut table = new_table(200);
            let mut columns = vec![Cell::new(format!("Fund ({})", first.year)).add_attribute(Attribute::Bold)];
            columns.extend(
                periods
                    .iter()
                    .map(|p| Cell::new(p.month).add_attribute(Attribute::Bold)),
            );
            table.set_header(columns);

            for row in &table_data.rows {
                let mut cells = vec![Cell::new(&row.fund)];
                cells.extend(row.cells[offset..offset + periods.len()].iter().map(|cell| match cell {
                    Some(v) => money_cell(*v, currency),
                    None => Cell::new("-").set_alignment(CellAlignment::Center),
                }));
                table.add_row(cells);
            }

            let mut footer = vec![Cell::new("Month Total").add_attribute(Attribute::Bold)];
            footer.extend(
                table_data.month_totals[offset..offset + periods.len()]
                    .iter()
                    .map(|v| money_cell(*v, currency).fg(TColor::Green)),
            );
            table.add_row(footer);
            println!("{table}");
        }
        println!(
            "Overall invested: {}",
            format_currency(table_data.overall_total, currency)
        );
    }
}

fn new_table(width: u16) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width);
    table
}

fn header(names: &[&str]) -> Vec<Cell> {
    names
        .iter()
        .map(|n| Cell::new(n).add_attribute(Attribute::Bold))
        .collect()
}

fn money_cell(value: f64, currency: &str) -> Cell {
    Cell::new(format_currency(value, currency)).set_alignment(CellAlignment::Right)
}

fn signed_money_cell(value: f64, currency: &str) -> Cell {
    let c = if value >= 0.0 { TColor::Green } else { TColor::Red };
    money_cell(value, currency).fg(c)
}

fn pct_cell(value: f64) -> Cell {
    let c = if value >= 0.0 { TColor::Green } else { TColor::Red };
    Cell::new(format_percent(value))
        .set_alignment(CellAlignment::Right)
        .fg(c)
}

fn health_color(status: HealthStatus) -> TColor {
    match status {
        HealthStatus::Excellent => TColor::Green,
        HealthStatus::Good => TColor::Blue,
        HealthStatus::Fair => TColor::Yellow,
        HealthStatus::Poor => TColor::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry;

    fn settings() -> Settings {
        Settings::new(
            vec![
                "Parag Parikh Flexi Cap".to_string(),
                "ICICI Prudential Bluechip".to_string(),
            ],
            vec![2025, 2026, 2027],
        )
    }

    fn sample() -> Vec<Entry> {
        vec![
            Entry::new("Parag Parikh Flexi Cap", 5000.0, 5000.0, 2025, Month::Jan),
            Entry::new("ICICI Prudential Bluechip", 3000.0, 3000.0, 2025, Month::Jan),
            Entry::new("Parag Parikh Flexi Cap", 5000.0, 10400.0, 2025, Month::Feb),
            Entry::new("Nifty Index", 2000.0, 2100.0, 2026, Month::Feb),
        ]
    }

    #[test]
    fn test_empty_dashboard() {
        let dashboard = Dashboard::compute(&[], &settings());
        assert_eq!(dashboard.summary.total_invested, 0.0);
        assert_eq!(dashboard.summary.total_current, 0.0);
        assert_eq!(dashboard.summary.profit_loss_percent, 0.0);
        assert_eq!(dashboard.summary.health_status, HealthStatus::Fair);
        assert!(dashboard.monthly_profit.is_empty());
        assert!(dashboard.allocation.is_empty());
        assert!(dashboard.returns_comparison.is_empty());
        assert_eq!(dashboard.investment_table.rows.len(), 2);
        assert!(dashboard.investment_table.rows[0].cells.iter().all(Option::is_none));
        assert_eq!(dashboard.month_totals.len(), 36);
    }

    #[test]
    fn test_summary_uses_last_known_value() {
        let dashboard = Dashboard::compute(&sample(), &settings());
        let s = &dashboard.summary;
        assert_eq!(s.total_invested, 15000.0);
        // Feb 2026 is the last period with data: only Nifty reported there
        assert_eq!(s.total_current, 2100.0);
        assert_eq!(s.profit_loss, -12900.0);
        assert_eq!(s.health_status, HealthStatus::Poor);
    }

    #[test]
    fn test_monthly_profit_chart_drops_zero_months() {
        let entries = vec![
            Entry::new("A", 1000.0, 1000.0, 2025, Month::Jan),
            Entry::new("A", 1000.0, 2200.0, 2025, Month::Feb),
        ];
        let dashboard = Dashboard::compute(&entries, &settings());
        assert_eq!(dashboard.monthly_profit.len(), 1);
        assert_eq!(dashboard.monthly_profit[0].period, Period::new(2025, Month::Jan));
        assert_eq!(dashboard.monthly_profit[0].profit, 200.0);
        assert_eq!(dashboard.summary.monthly_profit_total, 200.0);
        assert_eq!(dashboard.summary.profit_loss_percent, 10.0);
        assert_eq!(dashboard.summary.health_status, HealthStatus::Good);
    }

    #[test]
    fn test_investment_table_and_month_totals_agree() {
        let entries = sample();
        let dashboard = Dashboard::compute(&entries, &settings());
        let table = &dashboard.investment_table;

        assert_eq!(table.periods.len(), 36);
        assert_eq!(
            table.rows.iter().map(|r| r.fund.as_str()).collect::<Vec<_>>(),
            vec!["Parag Parikh Flexi Cap", "ICICI Prudential Bluechip", "Nifty Index"]
        );
        assert_eq!(table.rows[0].cells[1], Some(5000.0));
        assert_eq!(table.rows[1].cells[1], None);
        assert_eq!(table.month_totals[0], 8000.0);
        assert_eq!(table.overall_total, 15000.0);

        let month_sum: f64 = dashboard.month_totals.iter().map(|m| m.invested).sum();
        assert_eq!(month_sum, table.overall_total);
    }

    #[test]
    fn test_export_and_reingest_gives_same_dashboard() {
        let entries = sample();
        let exported = entry::to_string(&entries).unwrap();
        let reloaded = entry::from_string(&exported).unwrap();
        assert_eq!(
            Dashboard::compute(&reloaded, &settings()),
            Dashboard::compute(&entries, &settings())
        );
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let json = Dashboard::compute(&sample(), &settings()).to_json().unwrap();
        assert!(json.contains("\"cumulativeGrowth\""));
        assert!(json.contains("\"sipWiseGrowth\""));
        assert!(json.contains("\"profitLossPercent\""));
        assert!(json.contains("\"healthStatus\": \"Poor\""));
    }
}
