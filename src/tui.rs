use crate::aggregate::{HealthStatus, Settings};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::entry::EntryDraft;
use crate::format::{format_currency, format_percent};
use crate::ledger::Ledger;
use crate::period::{Month, Period};
use crate::store::{self, Store};
use chrono::Datelike;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info, warn};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};
use std::io;
use std::path::Path;
use std::time::Duration;
use tui_big_text::{BigText, PixelSize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Overview,
    Growth,
    Funds,
    Details,
}

impl Tab {
    fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Growth => "Growth",
            Tab::Funds => "Funds",
            Tab::Details => "Investment Details",
        }
    }

    fn all() -> &'static [Tab] {
        &[Tab::Overview, Tab::Growth, Tab::Funds, Tab::Details]
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "overview" => Some(Tab::Overview),
            "growth" => Some(Tab::Growth),
            "funds" => Some(Tab::Funds),
            "details" | "table" => Some(Tab::Details),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Normal,
    AddEntry,
}

/// Input fields of the add-entry dialog, in tab order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Fund,
    Invested,
    Current,
    Year,
    Month,
}

impl FormField {
    fn all() -> &'static [FormField] {
        &[
            FormField::Fund,
            FormField::Invested,
            FormField::Current,
            FormField::Year,
            FormField::Month,
        ]
    }

    fn label(self) -> &'static str {
        match self {
            FormField::Fund => "Fund Name",
            FormField::Invested => "Invested Amount",
            FormField::Current => "Current Value",
            FormField::Year => "Year",
            FormField::Month => "Month",
        }
    }

    fn position(self) -> usize {
        FormField::all().iter().position(|&f| f == self).unwrap_or(0)
    }

    fn next(self) -> FormField {
        let fields = FormField::all();
        fields[(self.position() + 1) % fields.len()]
    }

    fn previous(self) -> FormField {
        let fields = FormField::all();
        fields[(self.position() + fields.len() - 1) % fields.len()]
    }
}

pub struct App {
    pub current_tab: Tab,
    pub ledger: Ledger,
    pub settings: Settings,
    pub dashboard: Dashboard,
    pub currency: String,
    pub export_file: String,
    pub should_quit: bool,
    pub mode: AppMode,
    pub draft: EntryDraft,
    pub focused_field: FormField,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
    pub selected_year: usize,
}

impl App {
    pub fn new(ledger: Ledger, cfg: &Config) -> App {
        let settings = cfg.settings();
        let dashboard = ledger.dashboard(&settings);
        App {
            current_tab: Tab::Overview,
            ledger,
            settings,
            dashboard,
            currency: cfg.currency.clone(),
            export_file: cfg.export_file.clone(),
            should_quit: false,
            mode: AppMode::Normal,
            draft: EntryDraft::default(),
            focused_field: FormField::Fund,
            error_message: None,
            status_message: None,
            selected_year: 0,
        }
    }

    /// Recomputes every view-model from the current entry list.
    fn refresh(&mut self) {
        self.dashboard = self.ledger.dashboard(&self.settings);
    }

    pub fn next_tab(&mut self) {
        let tabs = Tab::all();
        let current_index = tabs
            .iter()
            .position(|&t| t == self.current_tab)
            .unwrap_or(0);
        self.current_tab = tabs[(current_index + 1) % tabs.len()];
    }

    pub fn previous_tab(&mut self) {
        let tabs = Tab::all();
        let current_index = tabs
            .iter()
            .position(|&t| t == self.current_tab)
            .unwrap_or(0);
        self.current_tab = tabs[(current_index + tabs.len() - 1) % tabs.len()];
    }

    pub fn select_next_year(&mut self) {
        if self.selected_year + 1 < self.settings.years.len() {
            self.selected_year += 1;
        }
    }

    pub fn select_previous_year(&mut self) {
        self.selected_year = self.selected_year.saturating_sub(1);
    }

    /// Period suggested for a new entry: the month after the latest entry, or
    /// the current month when nothing has been recorded yet.
    fn suggested_period(&self) -> Period {
        match self.ledger.entries().iter().map(|e| e.period()).max() {
            Some(latest) => latest.successor(),
            None => {
                let today = chrono::Local::now();
                let month = Month::from_index(today.month0() as usize).unwrap_or(Month::Jan);
                Period::new(today.year(), month)
            }
        }
    }

    pub fn open_add_dialog(&mut self) {
        let period = self.suggested_period();
        self.draft = EntryDraft {
            year: period.year.to_string(),
            month: period.month.to_string(),
            ..EntryDraft::default()
        };
        self.focused_field = FormField::Fund;
        self.mode = AppMode::AddEntry;
    }

    pub fn close_add_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.draft = EntryDraft::default();
    }

    fn focused_input(&mut self) -> &mut String {
        match self.focused_field {
            FormField::Fund => &mut self.draft.fund_name,
            FormField::Invested => &mut self.draft.invested,
            FormField::Current => &mut self.draft.current,
            FormField::Year => &mut self.draft.year,
            FormField::Month => &mut self.draft.month,
        }
    }

    pub fn input_char(&mut self, c: char) {
        let accepted = match self.focused_field {
            FormField::Fund | FormField::Month => !c.is_control(),
            FormField::Invested | FormField::Current => {
                c.is_ascii_digit() || (c == '.' && !self.focused_input().contains('.'))
            }
            FormField::Year => c.is_ascii_digit(),
        };
        if accepted {
            self.focused_input().push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.focused_input().pop();
    }

    /// Cycles the fund field through the known funds.
    pub fn cycle_fund(&mut self) {
        let funds = &self.dashboard.investment_table.rows;
        if funds.is_empty() {
            return;
        }
        let next = funds
            .iter()
            .position(|row| row.fund == self.draft.fund_name)
            .map(|i| (i + 1) % funds.len())
            .unwrap_or(0);
        self.draft.fund_name = funds[next].fund.clone();
    }

    /// Submits the dialog. On failure the entry list is left as it was and the
    /// error is shown in a popup.
    pub async fn submit(&mut self, store: &Store) {
        let result = self.ledger.add(store, &self.draft).await.map(|e| e.period());
        match result {
            Ok(period) => {
                self.status_message = Some(format!("Added entry for {period}"));
                self.close_add_dialog();
                self.refresh();
            }
            Err(e) => {
                warn!("Entry rejected: {e}");
                self.error_message = Some(e.to_string());
            }
        }
    }

    pub async fn export(&mut self) {
        match store::write_json(Path::new(&self.export_file), self.ledger.entries()).await {
            Ok(()) => {
                info!("Exported {} entries to {}", self.ledger.entries().len(), self.export_file);
                self.status_message = Some(format!("Exported to {}", self.export_file));
            }
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    pub async fn handle_key(&mut self, code: KeyCode, store: &Store) {
        if self.error_message.is_some() {
            // any key dismisses the popup
            self.error_message = None;
            return;
        }
        match self.mode {
            AppMode::Normal => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => self.previous_tab(),
                KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => self.next_tab(),
                KeyCode::Char('j') | KeyCode::Down => self.select_next_year(),
                KeyCode::Char('k') | KeyCode::Up => self.select_previous_year(),
                KeyCode::Char('a') => self.open_add_dialog(),
                KeyCode::Char('x') => self.export().await,
                KeyCode::Char('1') => self.current_tab = Tab::Overview,
                KeyCode::Char('2') => self.current_tab = Tab::Growth,
                KeyCode::Char('3') => self.current_tab = Tab::Funds,
                KeyCode::Char('4') => self.current_tab = Tab::Details,
                _ => {}
            },
            AppMode::AddEntry => match code {
                KeyCode::Esc => self.close_add_dialog(),
                KeyCode::Enter => self.submit(store).await,
                KeyCode::Tab | KeyCode::Down => self.focused_field = self.focused_field.next(),
                KeyCode::BackTab | KeyCode::Up => self.focused_field = self.focused_field.previous(),
                KeyCode::Right if self.focused_field == FormField::Fund => self.cycle_fund(),
                KeyCode::Backspace => self.backspace(),
                KeyCode::Char(c) => self.input_char(c),
                _ => {}
            },
        }
    }
}

pub async fn run_tui(
    ledger: Ledger,
    store: Store,
    cfg: Config,
    tab: Option<Tab>,
    startup_error: Option<String>,
) -> eyre::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(ledger, &cfg);
    app.error_message = startup_error;
    if let Some(tab) = tab {
        app.current_tab = tab;
    }

    let res = run_app(&mut terminal, &mut app, &store).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Dashboard loop failed: {err}");
        return Err(err.into());
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &Store,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if crossterm::event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, store).await;
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let tab_titles: Vec<Line> = Tab::all()
        .iter()
        .map(|t| {
            let style = if *t == app.current_tab {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(t.title(), style))
        })
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title("SIP Tracker"))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow))
        .select(
            Tab::all()
                .iter()
                .position(|&t| t == app.current_tab)
                .unwrap_or(0),
        );
    f.render_widget(tabs, chunks[0]);

    match app.current_tab {
        Tab::Overview => render_overview(f, chunks[1], app),
        Tab::Growth => render_growth(f, chunks[1], app),
        Tab::Funds => render_funds(f, chunks[1], app),
        Tab::Details => render_details(f, chunks[1], app),
    }

    let help = match &app.status_message {
        Some(status) => format!("{status} | a (add) | x (export) | h/l (tabs) | q (quit)"),
        None => "a (add entry) | x (export) | h/l (tabs) | j/k (year in details) | 1-4 (direct) | q (quit)"
            .to_string(),
    };
    let help_text = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help_text, chunks[2]);

    if app.mode == AppMode::AddEntry {
        render_add_dialog(f, app);
    }

    if let Some(error) = &app.error_message {
        render_error_popup(f, error);
    }
}

fn health_color(status: HealthStatus) -> Color {
    status.color().parse::<Color>().unwrap_or(Color::White)
}

fn pnl_color(value: f64) -> Color {
    if value >= 0.0 {
        Color::Green
    } else {
        Color::Red
    }
}

fn render_overview(f: &mut Frame, area: Rect, app: &App) {
    let summary = &app.dashboard.summary;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let big_text_value = format_currency(summary.total_current, &app.currency);
    let big_text = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(
            Style::default()
                .fg(pnl_color(summary.profit_loss))
                .add_modifier(Modifier::BOLD),
        )
        .lines(vec![big_text_value.clone().into()])
        .build();

    let big_text_widget = Block::default()
        .borders(Borders::ALL)
        .title(format!("Current Value ({})", app.currency))
        .title_alignment(Alignment::Center);
    f.render_widget(big_text_widget, chunks[0]);

    let inner = chunks[0].inner(ratatui::layout::Margin {
        horizontal: 1,
        vertical: 1,
    });
    let big_text_width = big_text_value.chars().count() as u16 * 4;
    let centered_area = if big_text_width < inner.width {
        let margin = (inner.width - big_text_width) / 2;
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(margin),
                Constraint::Min(0),
                Constraint::Length(margin),
            ])
            .split(inner)[1]
    } else {
        inner
    };
    f.render_widget(big_text, centered_area);

    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let status = summary.health_status;
    let stats = vec![
        ListItem::new(format!(
            "Total Invested   {}",
            format_currency(summary.total_invested, &app.currency)
        )),
        ListItem::new(format!(
            "Current Value    {}",
            format_currency(summary.total_current, &app.currency)
        )),
        ListItem::new(Line::from(vec![
            Span::raw("Profit/Loss      "),
            Span::styled(
                format!(
                    "{} ({})",
                    format_currency(summary.profit_loss, &app.currency),
                    format_percent(summary.profit_loss_percent)
                ),
                Style::default().fg(pnl_color(summary.profit_loss)),
            ),
        ])),
        ListItem::new(Line::from(vec![
            Span::raw("Health           "),
            Span::styled(
                status.label(),
                Style::default()
                    .fg(health_color(status))
                    .add_modifier(Modifier::BOLD),
            ),
        ])),
        ListItem::new(format!("Entries          {}", app.ledger.entries().len())),
    ];
    let stats_list = List::new(stats)
        .block(Block::default().borders(Borders::ALL).title("Summary"))
        .style(Style::default().fg(Color::White));
    f.render_widget(stats_list, lower[0]);

    let yearly: Vec<ListItem> = app
        .dashboard
        .year_wise_investment
        .iter()
        .zip(&app.dashboard.yearly_profit_by_fund)
        .map(|(invested, profit)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<6}", invested.year), Style::default().fg(Color::Cyan)),
                Span::raw(format!(
                    "invested {:>16}  ",
                    format_currency(invested.total, &app.currency)
                )),
                Span::styled(
                    format!("profit {:>14}", format_currency(profit.total, &app.currency)),
                    Style::default().fg(pnl_color(profit.total)),
                ),
            ]))
        })
        .collect();
    let yearly_list = List::new(yearly)
        .block(Block::default().borders(Borders::ALL).title("Year-wise"))
        .style(Style::default().fg(Color::White));
    f.render_widget(yearly_list, lower[1]);
}

fn short_label(period: &Period) -> String {
    format!("{}{:02}", period.month, period.year.rem_euclid(100))
}

fn render_growth(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(35), Constraint::Min(0)])
        .split(area);

    // only periods up to the last one with data are worth drawing
    let last_index = app
        .dashboard
        .monthly_investment_trend
        .iter()
        .rposition(|p| p.amount > 0.0)
        .map(|i| i + 1)
        .unwrap_or(0);

    let labels: Vec<String> = app.dashboard.timeline[..last_index]
        .iter()
        .map(short_label)
        .collect();

    let growth: Vec<(&str, u64)> = labels
        .iter()
        .zip(&app.dashboard.cumulative_growth)
        .map(|(label, point)| (label.as_str(), point.last_known_current_value.max(0.0) as u64))
        .collect();
    let growth_chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Current Value (last known)"),
        )
        .data(&growth)
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(Style::default().fg(Color::Black).bg(Color::Magenta));
    f.render_widget(growth_chart, chunks[0]);

    let flow: Vec<(&str, u64)> = labels
        .iter()
        .zip(&app.dashboard.monthly_investment_trend)
        .map(|(label, point)| (label.as_str(), point.amount.max(0.0) as u64))
        .collect();
    let flow_chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Invested per Month"))
        .data(&flow)
        .bar_width(7)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Blue))
        .value_style(Style::default().fg(Color::Black).bg(Color::Blue));
    f.render_widget(flow_chart, chunks[1]);

    let profit: Vec<ListItem> = app
        .dashboard
        .monthly_profit
        .iter()
        .map(|record| {
            ListItem::new(Line::from(vec![
                Span::raw(format!("{:<10}", record.period.label())),
                Span::styled(
                    format_currency(record.profit, &app.currency),
                    Style::default().fg(pnl_color(record.profit)),
                ),
            ]))
        })
        .collect();
    let profit_list = List::new(profit)
        .block(Block::default().borders(Borders::ALL).title("Monthly Profit"))
        .style(Style::default().fg(Color::White));
    f.render_widget(profit_list, chunks[2]);
}

fn render_funds(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let total = app.dashboard.summary.total_invested;
    let allocation: Vec<ListItem> = app
        .dashboard
        .allocation
        .iter()
        .map(|slice| {
            let share = if total > 0.0 { slice.amount / total * 100.0 } else { 0.0 };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:<30}", slice.fund), Style::default().fg(Color::Cyan)),
                Span::raw(format!("{:>16}", format_currency(slice.amount, &app.currency))),
                Span::styled(format!("{share:>8.2}%"), Style::default().fg(Color::Yellow)),
            ]))
        })
        .collect();
    let allocation_list = List::new(allocation)
        .block(Block::default().borders(Borders::ALL).title("Allocation"))
        .style(Style::default().fg(Color::White));
    f.render_widget(allocation_list, chunks[0]);

    let header = Row::new(["Fund", "Invested", "Latest", "Returns"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    }))
    .height(1)
    .bottom_margin(1);

    let rows = app.dashboard.returns_comparison.iter().map(|fund| {
        Row::new(vec![
            Cell::from(fund.fund.clone()),
            Cell::from(format_currency(fund.invested, &app.currency)),
            Cell::from(format_currency(fund.latest_current, &app.currency)),
            Cell::from(format_percent(fund.returns_percent))
                .style(Style::default().fg(pnl_color(fund.returns_percent))),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Returns Comparison"))
    .style(Style::default().fg(Color::White));
    f.render_widget(table, chunks[1]);
}

fn render_details(f: &mut Frame, area: Rect, app: &App) {
    let table_data = &app.dashboard.investment_table;
    let months = app.settings.months.len();
    let offset = app.selected_year * months;
    // the grid holds one run of months per year, so the year comes from it
    let Some(year) = table_data.periods.get(offset).map(|p| p.year) else {
        let placeholder = Paragraph::new("No years configured")
            .block(Block::default().borders(Borders::ALL).title("Investment Details"))
            .alignment(Alignment::Center);
        f.render_widget(placeholder, area);
        return;
    };
    let end = (offset + months).min(table_data.periods.len());

    let mut header_cells = vec![Cell::from("Fund")];
    header_cells.extend(
        table_data.periods[offset..end]
            .iter()
            .map(|p| Cell::from(p.month.to_string())),
    );
    let header = Row::new(header_cells.into_iter().map(|c| {
        c.style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    }))
    .height(1)
    .bottom_margin(1);

    let rows = table_data.rows.iter().map(|row| {
        let mut cells = vec![Cell::from(row.fund.clone())];
        cells.extend(row.cells[offset..end].iter().map(|cell| match cell {
            Some(v) => Cell::from(format!("{v:.0}")),
            None => Cell::from("-").style(Style::default().fg(Color::DarkGray)),
        }));
        Row::new(cells).height(1)
    });

    let mut total_cells = vec![Cell::from("Month Total").style(
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    )];
    total_cells.extend(
        table_data.month_totals[offset..end]
            .iter()
            .map(|v| Cell::from(format!("{v:.0}")).style(Style::default().fg(Color::Green))),
    );
    let total_row = Row::new(total_cells).height(1);

    let mut constraints = vec![Constraint::Length(28)];
    constraints.extend(std::iter::repeat(Constraint::Length(9)).take(end - offset));

    let title = format!(
        "Investment Details {year} - overall {}",
        format_currency(table_data.overall_total, &app.currency)
    );
    let table = Table::new(rows.chain(std::iter::once(total_row)), constraints)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(Color::White));
    f.render_widget(table, area);
}

fn render_add_dialog(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, popup_area);

    let main_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Add SIP Entry ")
        .title_alignment(Alignment::Center)
        .style(Style::default().bg(Color::Black));
    f.render_widget(main_block, popup_area);

    let mut constraints: Vec<Constraint> = FormField::all().iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(0));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(popup_area);

    for (i, field) in FormField::all().iter().enumerate() {
        let value = match field {
            FormField::Fund => &app.draft.fund_name,
            FormField::Invested => &app.draft.invested,
            FormField::Current => &app.draft.current,
            FormField::Year => &app.draft.year,
            FormField::Month => &app.draft.month,
        };
        let focused = *field == app.focused_field;
        let border_color = if focused { Color::Yellow } else { Color::Gray };
        let text = if focused { format!("{value}█") } else { value.clone() };
        let input = Paragraph::new(text)
            .style(Style::default().fg(Color::White))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border_color))
                    .title(format!(" {} ", field.label())),
            );
        f.render_widget(input, layout[i]);
    }

    let instructions =
        "Enter: Save | Esc: Cancel | Tab/Up/Down: Move | Right on fund: cycle known funds";
    let instructions_paragraph = Paragraph::new(instructions)
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(instructions_paragraph, layout[FormField::all().len()]);
}

fn render_error_popup(f: &mut Frame, error: &str) {
    let popup_area = centered_rect(60, 20, f.area());
    f.render_widget(Clear, popup_area);

    let error_paragraph = Paragraph::new(error)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Error (press any key)")
                .style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(error_paragraph, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Entry;
    use ratatui::backend::TestBackend;

    fn temp_store(name: &str) -> (Store, std::path::PathBuf) {
        let path = std::env::temp_dir().join(format!("sip_tracker_tui_{}_{}", std::process::id(), name));
        let _ = std::fs::remove_file(&path);
        (Store::json(&path), path)
    }

    fn app_with(entries: Vec<Entry>) -> App {
        App::new(Ledger::new(entries), &Config::default())
    }

    #[test]
    fn test_tab_navigation() {
        let mut app = app_with(Vec::new());
        assert_eq!(app.current_tab, Tab::Overview);
        app.next_tab();
        assert_eq!(app.current_tab, Tab::Growth);
        app.previous_tab();
        app.previous_tab();
        assert_eq!(app.current_tab, Tab::Details);
        assert_eq!(Tab::from_name("Funds"), Some(Tab::Funds));
        assert_eq!(Tab::from_name("nope"), None);
    }

    #[test]
    fn test_add_dialog_suggests_next_period() {
        let mut app = app_with(vec![
            Entry::new("A", 100.0, 100.0, 2025, Month::Nov),
            Entry::new("A", 100.0, 210.0, 2025, Month::Dec),
        ]);
        app.open_add_dialog();
        assert_eq!(app.mode, AppMode::AddEntry);
        assert_eq!(app.draft.year, "2026");
        assert_eq!(app.draft.month, "Jan");
        assert!(app.draft.fund_name.is_empty());
    }

    #[test]
    fn test_numeric_fields_only_accept_numbers() {
        let mut app = app_with(Vec::new());
        app.open_add_dialog();
        app.focused_field = FormField::Invested;
        for c in "12a.5.0".chars() {
            app.input_char(c);
        }
        assert_eq!(app.draft.invested, "12.50");
        app.backspace();
        assert_eq!(app.draft.invested, "12.5");
    }

    #[test]
    fn test_cycle_fund_walks_known_funds() {
        let mut app = app_with(Vec::new());
        app.open_add_dialog();
        app.cycle_fund();
        assert_eq!(app.draft.fund_name, "Parag Parikh Flexi Cap");
        app.cycle_fund();
        assert_eq!(app.draft.fund_name, "ICICI Prudential Bluechip");
        app.cycle_fund();
        assert_eq!(app.draft.fund_name, "Parag Parikh Flexi Cap");
    }

    #[tokio::test]
    async fn test_invalid_submit_shows_error_and_keeps_state() {
        let (store, path) = temp_store("invalid.json");
        let mut app = app_with(Vec::new());
        app.handle_key(KeyCode::Char('a'), &store).await;
        app.handle_key(KeyCode::Enter, &store).await;

        assert_eq!(app.error_message.as_deref(), Some("Fund name is required"));
        assert_eq!(app.mode, AppMode::AddEntry);
        assert!(app.ledger.entries().is_empty());
        assert!(!path.exists());

        // any key dismisses the error, the dialog stays open
        app.handle_key(KeyCode::Char('z'), &store).await;
        assert!(app.error_message.is_none());
        assert_eq!(app.mode, AppMode::AddEntry);
    }

    #[tokio::test]
    async fn test_valid_submit_recomputes_dashboard() {
        let (store, path) = temp_store("valid.json");
        let mut app = app_with(Vec::new());
        app.open_add_dialog();
        app.draft = EntryDraft {
            fund_name: "A".to_string(),
            invested: "1000".to_string(),
            current: "1100".to_string(),
            year: "2025".to_string(),
            month: "Jan".to_string(),
        };
        app.submit(&store).await;

        assert!(app.error_message.is_none());
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.dashboard.summary.total_invested, 1000.0);
        assert_eq!(app.dashboard.summary.total_current, 1100.0);
        assert_eq!(app.status_message.as_deref(), Some("Added entry for Jan-2025"));
        std::fs::remove_file(&path).unwrap();
    }

    fn details_title(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(200, 20)).unwrap();
        terminal.draw(|f| render_details(f, f.area(), app)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, 0)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_details_with_repeated_years() {
        let cfg = Config {
            years: vec![2025, 2025, 2025],
            ..Config::default()
        };
        let mut app = App::new(Ledger::new(Vec::new()), &cfg);
        assert_eq!(app.settings.years, vec![2025]);
        app.select_next_year();
        app.select_next_year();
        assert_eq!(app.selected_year, 0);
        assert!(details_title(&app).contains("Investment Details 2025"));

        // an index past the grid renders the placeholder instead of slicing
        app.selected_year = 2;
        assert!(!details_title(&app).contains("2025"));
    }

    #[test]
    fn test_details_title_matches_columns_for_unsorted_years() {
        let cfg = Config {
            years: vec![2027, 2025],
            ..Config::default()
        };
        let mut app = App::new(Ledger::new(Vec::new()), &cfg);
        assert!(details_title(&app).contains("Investment Details 2025"));
        app.select_next_year();
        assert_eq!(app.selected_year, 1);
        assert!(details_title(&app).contains("Investment Details 2027"));
    }

    #[test]
    fn test_every_tab_renders() {
        let mut app = app_with(vec![
            Entry::new("Parag Parikh Flexi Cap", 5000.0, 5000.0, 2025, Month::Jan),
            Entry::new("Parag Parikh Flexi Cap", 5000.0, 10600.0, 2025, Month::Feb),
        ]);
        let mut terminal = Terminal::new(TestBackend::new(160, 50)).unwrap();
        for _ in Tab::all() {
            terminal.draw(|f| ui(f, &app)).unwrap();
            app.next_tab();
        }
        app.open_add_dialog();
        app.error_message = Some("boom".to_string());
        terminal.draw(|f| ui(f, &app)).unwrap();
    }
}
