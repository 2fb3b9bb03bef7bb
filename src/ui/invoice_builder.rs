use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::config::Config;
use crate::ledger::{format_money, Applied, Ledger, LedgerCommand, LedgerSettings};
use crate::models::{ClientDetails, ItemDraft, ItemField, ItemId, LineItem};
use crate::source::DataSource;
use crate::ui::components::editable_field::{EditableField, FieldKind};

const NAME_PLACEHOLDER: &str = "item name";
const PRICE_PLACEHOLDER: &str = "item price";
const DESCRIPTION_PLACEHOLDER: &str = "item description...";
const DISCOUNT_PLACEHOLDER: &str = "0";
const LOGO_PLACEHOLDER: &str = "path/to/logo.png";
const QUANTITY_PLACEHOLDER: &str = "1";

// What the keyboard is currently typing into
enum Editing {
    Item(ItemId, ItemField, EditableField),
    Quantity(ItemId, EditableField),
    Discount(EditableField),
    Logo(EditableField),
}

// Represents the invoice builder screen
pub struct InvoiceBuilderState {
    ledger: Ledger,
    client_details: ClientDetails,
    list_state: ListState,
    editing: Option<Editing>,
    discount_text: String,
    show_error: Option<String>,
}

pub enum InvoiceBuilderAction {
    Exit,
}

impl InvoiceBuilderState {
    pub fn new(ledger: Ledger, client_details: ClientDetails) -> Self {
        let mut list_state = ListState::default();
        if ledger.item_count() > 0 {
            list_state.select(Some(0));
        }

        Self {
            ledger,
            client_details,
            list_state,
            editing: None,
            discount_text: String::new(),
            show_error: None,
        }
    }

    /// Show a one-off notification on the first frame.
    pub fn with_notification(mut self, message: impl Into<String>) -> Self {
        self.show_error = Some(message.into());
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn client_details(&self) -> &ClientDetails {
        &self.client_details
    }

    pub fn notification(&self) -> Option<&str> {
        self.show_error.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn selected_id(&self) -> Option<ItemId> {
        self.list_state
            .selected()
            .and_then(|i| self.ledger.items().get(i))
            .map(|item| item.id)
    }

    pub fn next(&mut self) {
        let len = self.ledger.item_count();
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.ledger.item_count();
        if len == 0 {
            return;
        }

        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    /// Apply a command and keep the selection pointing at a real row.
    pub fn dispatch(&mut self, command: LedgerCommand) -> Applied {
        let applied = self.ledger.apply(command);

        match applied {
            Applied::Added(_) => {
                self.list_state.select(Some(self.ledger.item_count() - 1));
            }
            Applied::Removed(_) => {
                let len = self.ledger.item_count();
                let selected = self.list_state.selected().unwrap_or(0);
                self.list_state.select(if len == 0 { None } else { Some(selected.min(len - 1)) });
            }
            Applied::Changed | Applied::Ignored => {}
        }

        applied
    }

    pub fn add_item(&mut self) {
        self.dispatch(LedgerCommand::AddItem(ItemDraft::default()));
    }

    pub fn toggle_removal(&mut self) {
        self.dispatch(LedgerCommand::ToggleRemoval);
    }

    /// Enter on a row: remove it while removal is pending, edit it otherwise.
    pub fn activate_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };

        if self.ledger.is_removal_pending() {
            self.dispatch(LedgerCommand::ItemClicked(id));
        } else {
            self.start_item_editing(id, ItemField::Name);
        }
    }

    pub fn increment_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.dispatch(LedgerCommand::IncrementQuantity(id));
        }
    }

    pub fn decrement_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.dispatch(LedgerCommand::DecrementQuantity(id));
        }
    }

    fn start_item_editing(&mut self, id: ItemId, field: ItemField) {
        let Some(item) = self.ledger.item(id) else {
            return;
        };

        let mut input = match field {
            ItemField::Name => {
                EditableField::new(NAME_PLACEHOLDER, FieldKind::Text, item.name.clone())
            }
            ItemField::Price => EditableField::new(
                PRICE_PLACEHOLDER,
                FieldKind::Amount,
                item.price.map(|price| price.to_string()),
            ),
            ItemField::Description => {
                EditableField::new(
                    DESCRIPTION_PLACEHOLDER,
                    FieldKind::Text,
                    item.description.clone(),
                )
            }
        };
        input.focus();
        self.editing = Some(Editing::Item(id, field, input));
    }

    pub fn start_discount_editing(&mut self) {
        if !self.ledger.settings().discount_enabled {
            return;
        }

        let mut input = EditableField::new(
            DISCOUNT_PLACEHOLDER,
            FieldKind::Amount,
            Some(self.discount_text.clone()),
        );
        input.focus();
        self.editing = Some(Editing::Discount(input));
    }

    /// Type a quantity for the selected row instead of stepping it.
    pub fn start_quantity_editing(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };

        let mut input = EditableField::new(QUANTITY_PLACEHOLDER, FieldKind::Count, None);
        input.focus();
        self.editing = Some(Editing::Quantity(id, input));
    }

    pub fn start_logo_import(&mut self) {
        let mut input = EditableField::new(LOGO_PLACEHOLDER, FieldKind::Text, None);
        input.focus();
        self.editing = Some(Editing::Logo(input));
    }

    /// Forward a key to the focused field, pushing item and discount edits
    /// into the ledger as they are typed.
    pub fn edit_current_field(&mut self, key: KeyCode) {
        let command = match &mut self.editing {
            Some(Editing::Item(id, field, input)) => {
                if !input.handle_input(key) {
                    return;
                }
                LedgerCommand::EditField(*id, *field, input.value.clone())
            }
            Some(Editing::Quantity(id, input)) => {
                if !input.handle_input(key) || input.value.is_empty() {
                    return;
                }
                // digits only, so a failed parse means it is too large
                LedgerCommand::SetQuantity(*id, input.value.parse().unwrap_or(i64::MAX))
            }
            Some(Editing::Discount(input)) => {
                if !input.handle_input(key) {
                    return;
                }
                self.discount_text = input.value.clone();
                LedgerCommand::SetDiscount(input.value.clone())
            }
            Some(Editing::Logo(input)) => {
                input.handle_input(key);
                return;
            }
            None => return,
        };

        self.dispatch(command);
    }

    /// Tab/Enter while editing an item moves name -> price -> description.
    pub fn next_field_in_line_item(&mut self) {
        match self.editing.take() {
            Some(Editing::Item(id, field, mut input)) => {
                input.blur();
                match field.next() {
                    Some(next) => self.start_item_editing(id, next),
                    None => self.editing = None,
                }
            }
            other => {
                self.editing = other;
                self.finish_editing();
            }
        }
    }

    pub fn finish_editing(&mut self) {
        match self.editing.take() {
            Some(Editing::Item(_, _, mut input))
            | Some(Editing::Quantity(_, mut input))
            | Some(Editing::Discount(mut input)) => {
                input.blur();
            }
            Some(Editing::Logo(mut input)) => {
                input.blur();
                if !input.value.is_empty() && !self.client_details.import_logo(&input.value) {
                    self.show_error = Some(format!("{} is not an image file.", input.value));
                }
            }
            None => {}
        }
    }

    pub fn cancel_editing(&mut self) {
        match self.editing.take() {
            // Logo paths are only applied on Enter
            Some(Editing::Logo(_)) => {}
            other => {
                self.editing = other;
                self.finish_editing();
            }
        }
    }

    fn editing_display(&self, id: ItemId, field: ItemField) -> Option<String> {
        match &self.editing {
            Some(Editing::Item(edit_id, edit_field, input))
                if *edit_id == id && *edit_field == field =>
            {
                Some(input.get_display_string())
            }
            _ => None,
        }
    }

    fn quantity_display(&self, id: ItemId) -> Option<String> {
        match &self.editing {
            Some(Editing::Quantity(edit_id, input)) if *edit_id == id => {
                Some(input.get_display_string())
            }
            _ => None,
        }
    }
}

/// Fetch the seed once and build the single ledger for this run.
///
/// A failed fetch leaves the ledger empty and shows one notification.
pub async fn load_invoice(config: &Config) -> InvoiceBuilderState {
    let source = DataSource::from_location(config.data_source.clone());
    let settings = LedgerSettings {
        tax_percentage: config.tax_percentage,
        discount_enabled: source.supports_discount(),
    };

    match source.load().await {
        Ok(seed) => {
            let ledger = Ledger::seeded(settings, seed.items);
            InvoiceBuilderState::new(ledger, seed.client_details)
        }
        Err(err) => {
            tracing::error!(error = %err, ?source, "could not load invoice data");
            InvoiceBuilderState::new(Ledger::new(settings), ClientDetails::default())
                .with_notification(format!("Could not load invoice data: {}", err))
        }
    }
}

pub fn render_invoice_builder<B: Backend>(frame: &mut Frame<B>, state: &mut InvoiceBuilderState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(7),  // Client details
                Constraint::Min(8),     // Items
                Constraint::Length(4),  // Totals
                Constraint::Length(3),  // Help
            ]
            .as_ref(),
        )
        .split(frame.size());

    render_header(frame, state, chunks[0]);
    render_items(frame, state, chunks[1]);
    render_totals(frame, state, chunks[2]);

    let help_text = match &state.editing {
        Some(Editing::Item(..)) => "Type to edit | Tab/Enter - Next field | Esc - Done",
        Some(Editing::Quantity(..)) => "Type a quantity | Enter/Esc - Done",
        Some(Editing::Discount(_)) => "Type an amount | Enter/Esc - Done",
        Some(Editing::Logo(_)) => "Type an image path | Enter - Import | Esc - Cancel",
        None if state.ledger.is_removal_pending() => {
            "Enter - Remove selected item | R - Stop removing | A - Add item | Q - Quit"
        }
        None if state.ledger.settings().discount_enabled => {
            concat!(
                "A - Add | R - Remove mode | Enter - Edit | +/- - Quantity | N - Set quantity",
                " | D - Discount | L - Logo | Q - Quit",
            )
        }
        None => concat!(
            "A - Add | R - Remove mode | Enter - Edit | +/- - Quantity | N - Set quantity",
            " | L - Logo | Q - Quit",
        ),
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[3]);

    let size = frame.size();
    if let Some(Editing::Logo(input)) = &state.editing {
        render_logo_prompt(frame, size, &input.get_display_string());
    }

    if let Some(error) = &state.show_error {
        render_error(frame, size, error);
    }
}

fn render_header<B: Backend>(frame: &mut Frame<B>, state: &InvoiceBuilderState, area: Rect) {
    let details = &state.client_details;
    let label = Style::default().fg(Color::Cyan);
    let value = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());

    let content = vec![
        Spans::from(vec![Span::styled("Client: ", label), Span::raw(value(&details.client))]),
        Spans::from(vec![Span::styled("Address: ", label), Span::raw(value(&details.address))]),
        Spans::from(vec![Span::styled("Invoice #: ", label), Span::raw(value(&details.invoice))]),
        Spans::from(vec![
            Span::styled("Date issued: ", label),
            Span::raw(value(&details.date_issued)),
        ]),
        Spans::from(vec![
            Span::styled("Logo: ", label),
            Span::raw(details.logo.clone().unwrap_or_else(|| "(press L to import)".to_string())),
        ]),
    ];

    let header = Paragraph::new(content)
        .block(Block::default().title("Invoice").borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_items<B: Backend>(frame: &mut Frame<B>, state: &mut InvoiceBuilderState, area: Rect) {
    let view: &InvoiceBuilderState = state;
    let removing = view.ledger.is_removal_pending();

    let items = view
        .ledger
        .items()
        .iter()
        .map(|item| ListItem::new(item_lines(view, item)))
        .collect::<Vec<_>>();

    let block = Block::default()
        .title(if removing { "Items (removing)" } else { "Items" })
        .borders(Borders::ALL)
        .style(if removing {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        });

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White));

    frame.render_stateful_widget(list, area, &mut state.list_state);
}

fn item_lines<'a>(state: &InvoiceBuilderState, item: &LineItem) -> Vec<Spans<'a>> {
    let editing = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let shown = |field: ItemField, current: Option<String>, placeholder: &str| -> Span<'a> {
        match state.editing_display(item.id, field) {
            Some(text) => Span::styled(text, editing),
            None => match current {
                Some(text) => Span::raw(text),
                None => Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray)),
            },
        }
    };

    let price = shown(
        ItemField::Price,
        item.price.map(format_money),
        PRICE_PLACEHOLDER,
    );

    vec![
        Spans::from(vec![
            shown(ItemField::Name, item.name.clone(), NAME_PLACEHOLDER),
            Span::raw("  "),
            price,
        ]),
        Spans::from(vec![
            Span::raw("    QUANTITY "),
            match state.quantity_display(item.id) {
                Some(text) => Span::styled(text, editing),
                None => Span::raw(item.quantity.to_string()),
            },
            Span::raw(format!(
                "    TOTAL {}",
                format_money(state.ledger.item_total(item.id).unwrap_or_default())
            )),
        ]),
        Spans::from(vec![
            Span::raw("    "),
            shown(ItemField::Description, item.description.clone(), DESCRIPTION_PLACEHOLDER),
        ]),
    ]
}

fn render_totals<B: Backend>(frame: &mut Frame<B>, state: &InvoiceBuilderState, area: Rect) {
    let totals = state.ledger.compute_totals();
    let settings = state.ledger.settings();

    let mut first = vec![
        Span::raw(format!("Items: {}   ", state.ledger.item_count())),
        Span::styled("Total price: ", Style::default().fg(Color::Cyan)),
        Span::raw(format_money(totals.grand_total)),
    ];
    if settings.discount_enabled {
        let discount = match &state.editing {
            Some(Editing::Discount(input)) => Span::styled(
                input.get_display_string(),
                Style::default().fg(Color::Yellow),
            ),
            _ => Span::raw(format_money(totals.discount)),
        };
        first.push(Span::raw("   Discount: "));
        first.push(discount);
    }

    let content = vec![
        Spans::from(first),
        Spans::from(vec![
            Span::styled(
                format!("Total taxes ({}%): ", settings.tax_percentage),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format_money(totals.tax)),
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default().title("Totals").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn render_logo_prompt<B: Backend>(frame: &mut Frame<B>, size: Rect, input: &str) {
    let popup_area = centered_rect(60, 20, size);

    let prompt = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(format!("Logo image: {}", input)),
    ])
    .block(Block::default().title("Import client logo").borders(Borders::ALL))
    .style(Style::default().fg(Color::Yellow));

    frame.render_widget(prompt, popup_area);
}

fn render_error<B: Backend>(frame: &mut Frame<B>, size: Rect, error: &str) {
    let popup_area = centered_rect(60, 20, size);

    let error_msg = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(error),
        Spans::from(""),
        Spans::from("Press any key to continue"),
    ])
    .block(Block::default().title("Error").borders(Borders::ALL))
    .style(Style::default().fg(Color::Red));

    frame.render_widget(error_msg, popup_area);
}

// Helper function to create a centered rect
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

pub fn handle_input(state: &mut InvoiceBuilderState) -> Result<Option<InvoiceBuilderAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }

    Ok(None)
}

pub fn handle_key(state: &mut InvoiceBuilderState, key: KeyCode) -> Option<InvoiceBuilderAction> {
    // Any key dismisses a notification
    if state.show_error.take().is_some() {
        return None;
    }

    if state.editing.is_some() {
        match key {
            KeyCode::Esc => state.cancel_editing(),
            KeyCode::Enter | KeyCode::Tab => state.next_field_in_line_item(),
            _ => state.edit_current_field(key),
        }
        return None;
    }

    match key {
        KeyCode::Char('q') | KeyCode::Esc => return Some(InvoiceBuilderAction::Exit),
        KeyCode::Char('a') => state.add_item(),
        KeyCode::Char('r') => state.toggle_removal(),
        KeyCode::Char('d') => state.start_discount_editing(),
        KeyCode::Char('l') => state.start_logo_import(),
        KeyCode::Char('+') => state.increment_selected(),
        KeyCode::Char('-') => state.decrement_selected(),
        KeyCode::Char('n') => state.start_quantity_editing(),
        KeyCode::Enter => state.activate_selected(),
        KeyCode::Up => state.previous(),
        KeyCode::Down => state.next(),
        _ => {}
    }

    None
}
