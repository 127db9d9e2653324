//! TUI for EPP desk using ratatui
//!
//! Two screens: delivery registration and delivery history. F2 switches
//! between them.

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use epp_desk::signature::Point;
use epp_desk::views::{RegistrationView, SearchView};
use epp_desk::{EppClient, Notice, Settings};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Register,
    History,
}

/// Editable fields of the registration screen, in focus order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Cedula,
    Epp,
    Referencia,
    Cantidad,
    Labor,
}

const FIELDS: [Field; 5] = [
    Field::Cedula,
    Field::Epp,
    Field::Referencia,
    Field::Cantidad,
    Field::Labor,
];

impl Field {
    fn label(self) -> &'static str {
        match self {
            Field::Cedula => " Cédula (Enter para buscar) ",
            Field::Epp => " Elemento Entregado ",
            Field::Referencia => " Referencia/Tipo ",
            Field::Cantidad => " Cantidad ",
            Field::Labor => " Labor ",
        }
    }

    fn has_suggestions(self) -> bool {
        matches!(self, Field::Epp | Field::Referencia)
    }
}

/// Screen regions of the registration screen
struct RegisterLayout {
    fields: Vec<Rect>,
    issuer: Rect,
    worker: Rect,
    suggestions: Rect,
    signature: Rect,
    status: Rect,
}

fn register_layout(area: Rect) -> RegisterLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[0]);

    let mut left_constraints = vec![Constraint::Length(3); FIELDS.len() + 1];
    left_constraints.push(Constraint::Min(3));
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints(left_constraints)
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(6)])
        .split(columns[1]);

    RegisterLayout {
        fields: left[..FIELDS.len()].to_vec(),
        issuer: left[FIELDS.len()],
        worker: left[FIELDS.len() + 1],
        suggestions: right[0],
        signature: right[1],
        status: rows[1],
    }
}

/// Area inside a bordered block
fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x.saturating_add(1),
        y: area.y.saturating_add(1),
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Map a terminal cell inside `area` to signature pad pixels
fn cell_to_pad(area: Rect, column: u16, row: u16, pad_width: u32, pad_height: u32) -> Option<Point> {
    if area.width == 0
        || area.height == 0
        || column < area.x
        || row < area.y
        || column >= area.x + area.width
        || row >= area.y + area.height
    {
        return None;
    }
    // Aim at the middle of the cell
    let x = (f32::from(column - area.x) + 0.5) * pad_width as f32 / f32::from(area.width);
    let y = (f32::from(row - area.y) + 0.5) * pad_height as f32 / f32::from(area.height);
    Some(Point::new(x, y))
}

/// Application state for TUI
struct App {
    register: RegistrationView,
    history: SearchView,
    output_dir: PathBuf,
    screen: Screen,
    /// Index into FIELDS
    focus: usize,
    /// Highlighted suggestion of the focused field
    suggestion: Option<usize>,
    /// Last known terminal area, for mouse hit testing
    area: Rect,
    drawing: bool,
    history_scroll: u16,
    status: Option<Notice>,
    should_quit: bool,
}

impl App {
    fn new(client: EppClient, settings: Settings) -> Self {
        Self {
            register: RegistrationView::new(client.clone(), settings.issuer_name),
            history: SearchView::new(client),
            output_dir: settings.output_dir,
            screen: Screen::Register,
            focus: 0,
            suggestion: None,
            area: Rect::default(),
            drawing: false,
            history_scroll: 0,
            status: None,
            should_quit: false,
        }
    }

    fn focused(&self) -> Field {
        FIELDS[self.focus]
    }

    fn field_value(&self, field: Field) -> &str {
        let form = self.register.form();
        match field {
            Field::Cedula => &form.cedula,
            Field::Epp => &form.epp_entregado,
            Field::Referencia => &form.referencia_tipo,
            Field::Cantidad => &form.unidades_entregadas,
            Field::Labor => &form.tarea_labor,
        }
    }

    fn set_field(&mut self, field: Field, value: String) {
        match field {
            Field::Cedula => self.register.set_cedula(value),
            Field::Epp => self.register.set_epp_entregado(value),
            Field::Referencia => self.register.set_referencia_tipo(value),
            Field::Cantidad => self.register.set_unidades_entregadas(value),
            Field::Labor => self.register.set_tarea_labor(value),
        }
        self.suggestion = None;
    }

    fn edit_focused(&mut self, edit: impl FnOnce(&mut String)) {
        let field = self.focused();
        let mut value = self.field_value(field).to_string();
        edit(&mut value);
        self.set_field(field, value);
    }

    fn visible_suggestions(&self) -> Vec<&'static str> {
        match self.focused() {
            Field::Epp => self.register.equipment_suggestions().labels(),
            Field::Referencia => self.register.reference_suggestions().labels(),
            _ => Vec::new(),
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let n = FIELDS.len();
        self.focus = if forward {
            (self.focus + 1) % n
        } else {
            (self.focus + n - 1) % n
        };
        self.suggestion = None;
    }

    fn move_suggestion(&mut self, down: bool) {
        let count = self.visible_suggestions().len();
        if count == 0 {
            self.suggestion = None;
            return;
        }
        self.suggestion = Some(match (self.suggestion, down) {
            (None, true) => 0,
            (None, false) => count - 1,
            (Some(i), true) => (i + 1) % count,
            (Some(i), false) => (i + count - 1) % count,
        });
    }

    fn accept_suggestion(&mut self) -> bool {
        let labels = self.visible_suggestions();
        match self.suggestion.and_then(|i| labels.get(i).copied()) {
            Some(label) => {
                let field = self.focused();
                self.set_field(field, label.to_string());
                true
            }
            None => false,
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::F(2), _) => {
                self.screen = match self.screen {
                    Screen::Register => Screen::History,
                    Screen::History => Screen::Register,
                };
                self.status = None;
            }
            (KeyCode::Esc, _) => {
                self.status = None;
            }
            _ => match self.screen {
                Screen::Register => self.handle_register_key(key).await,
                Screen::History => self.handle_history_key(key).await,
            },
        }
    }

    async fn handle_register_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => {
                self.status = Some(match self.register.submit().await {
                    Ok(_) => RegistrationView::registered_notice(),
                    Err(notice) => notice,
                });
            }
            (KeyCode::Char('l'), KeyModifiers::CONTROL) => {
                self.register.clear();
                self.focus = 0;
                self.suggestion = None;
                self.status = None;
            }
            (KeyCode::Char('k'), KeyModifiers::CONTROL) => {
                self.register.clear_signature();
            }
            (KeyCode::Tab, _) => self.move_focus(true),
            (KeyCode::BackTab, _) => self.move_focus(false),
            (KeyCode::Up, _) if self.focused().has_suggestions() => self.move_suggestion(false),
            (KeyCode::Down, _) if self.focused().has_suggestions() => self.move_suggestion(true),
            (KeyCode::Up, _) => self.move_focus(false),
            (KeyCode::Down, _) => self.move_focus(true),
            (KeyCode::Enter, _) => {
                if self.focused() == Field::Cedula {
                    self.status = self.register.lookup_worker().await.err();
                } else if !self.accept_suggestion() {
                    self.move_focus(true);
                }
            }
            (KeyCode::Backspace, _) => {
                self.edit_focused(|value| {
                    value.pop();
                });
            }
            (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
                self.edit_focused(|value| value.push(c));
            }
            _ => {}
        }
    }

    async fn handle_history_key(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('p'), KeyModifiers::CONTROL) => {
                self.status = Some(match self.history.export_pdf(&self.output_dir) {
                    Ok(path) => Notice::success(format!("PDF guardado en {}", path.display())),
                    Err(notice) => notice,
                });
            }
            (KeyCode::Enter, _) => {
                self.history_scroll = 0;
                self.status = self.history.search().await.err();
            }
            (KeyCode::Up, _) => {
                self.history_scroll = self.history_scroll.saturating_sub(1);
            }
            (KeyCode::Down, _) => {
                self.history_scroll = self.history_scroll.saturating_add(1);
            }
            (KeyCode::PageUp, _) => {
                self.history_scroll = self.history_scroll.saturating_sub(10);
            }
            (KeyCode::PageDown, _) => {
                self.history_scroll = self.history_scroll.saturating_add(10);
            }
            (KeyCode::Backspace, _) => {
                let mut cedula = self.history.cedula().to_string();
                cedula.pop();
                self.history.set_cedula(cedula);
            }
            (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
                let mut cedula = self.history.cedula().to_string();
                cedula.push(c);
                self.history.set_cedula(cedula);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.screen != Screen::Register {
            return;
        }
        let area = inner(register_layout(self.area).signature);
        let pad = self.register.signature();
        let point = cell_to_pad(area, mouse.column, mouse.row, pad.width(), pad.height());

        match (mouse.kind, point) {
            (MouseEventKind::Down(MouseButton::Left), Some(p)) => {
                self.register.signature_mut().begin_stroke(p);
                self.drawing = true;
            }
            (MouseEventKind::Drag(MouseButton::Left), Some(p)) if self.drawing => {
                self.register.signature_mut().extend_stroke(p);
            }
            (MouseEventKind::Up(MouseButton::Left), _) => {
                self.drawing = false;
            }
            _ => {}
        }
    }
}

/// Run the TUI
pub async fn run(client: EppClient, settings: Settings) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, settings);

    // Main loop
    let result = loop {
        if let Err(e) = terminal.draw(|f| draw_ui(f, &app)) {
            break Err(e.into());
        }
        match terminal.size() {
            Ok(size) => app.area = Rect::new(0, 0, size.width, size.height),
            Err(e) => break Err(e.into()),
        }

        // Handle events with timeout
        match event::poll(std::time::Duration::from_millis(50)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => app.handle_key(key).await,
                Ok(Event::Mouse(mouse)) => app.handle_mouse(mouse),
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }

        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn draw_ui(f: &mut Frame, app: &App) {
    match app.screen {
        Screen::Register => draw_register(f, app),
        Screen::History => draw_history(f, app),
    }
}

fn field_block(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        })
}

fn draw_register(f: &mut Frame, app: &App) {
    let layout = register_layout(f.area());

    for (i, (field, area)) in FIELDS.iter().zip(&layout.fields).enumerate() {
        let focused = i == app.focus;
        let input = Paragraph::new(app.field_value(*field).to_string())
            .block(field_block(field.label(), focused));
        f.render_widget(input, *area);

        if focused {
            let len = app.field_value(*field).chars().count() as u16;
            f.set_cursor_position((area.x + 1 + len, area.y + 1));
        }
    }

    let issuer = Paragraph::new(app.register.form().nombre_entrega.clone())
        .style(Style::default().fg(Color::DarkGray))
        .block(field_block(" Entrega ", false));
    f.render_widget(issuer, layout.issuer);

    draw_worker(f, app, layout.worker);
    draw_suggestions(f, app, layout.suggestions);
    draw_signature(f, app, layout.signature);

    let (text, style) = match &app.status {
        Some(notice) => status_line(notice),
        None => (
            format!(
                " {} | Tab campo | Ctrl+S agregar | Ctrl+L limpiar | Ctrl+K limpiar firma | F2 historial | Ctrl+C salir",
                if app.register.can_submit() {
                    "Trabajador listo"
                } else {
                    "Busque un trabajador"
                }
            ),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
    };
    f.render_widget(Paragraph::new(text).style(style), layout.status);
}

fn draw_worker(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match app.register.worker() {
        Some(w) => vec![
            detail("Nombre", &w.nombre),
            detail("Apellido", &w.apellido),
            detail("Cédula", &w.cedula),
            detail("Área", &w.area),
            detail("Labor", &w.labor),
        ],
        None => vec![Line::from(Span::styled(
            "Sin trabajador",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let worker = Paragraph::new(Text::from(lines))
        .block(field_block(" Trabajador ", false))
        .wrap(Wrap { trim: false });
    f.render_widget(worker, area);
}

fn draw_suggestions(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .visible_suggestions()
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let style = if Some(i) == app.suggestion {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Green)
            };
            ListItem::new(Line::from(Span::styled(label, style)))
        })
        .collect();

    let list = List::new(items).block(field_block(" Sugerencias (↑/↓, Enter) ", false));
    f.render_widget(list, area);
}

fn draw_signature(f: &mut Frame, app: &App, area: Rect) {
    let canvas = inner(area);
    let grid = app
        .register
        .signature()
        .coverage(canvas.width, canvas.height);

    let lines: Vec<Line> = grid
        .iter()
        .map(|row| {
            let text: String = row.iter().map(|&ink| if ink { '█' } else { ' ' }).collect();
            Line::from(text)
        })
        .collect();

    let signature = Paragraph::new(Text::from(lines))
        .style(Style::default().fg(Color::White))
        .block(field_block(" Firma Digital (mouse) ", app.drawing));
    f.render_widget(signature, area);
}

fn draw_history(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search
            Constraint::Length(8), // Worker
            Constraint::Min(5),    // Deliveries
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let search = Paragraph::new(app.history.cedula().to_string())
        .block(field_block(" Cédula (Enter para buscar) ", true));
    f.render_widget(search, chunks[0]);
    f.set_cursor_position((
        chunks[0].x + 1 + app.history.cedula().chars().count() as u16,
        chunks[0].y + 1,
    ));

    let worker_lines: Vec<Line> = match app.history.worker() {
        Some(w) => vec![
            detail("Nombre del trabajador", &w.full_name()),
            detail("Cédula", &w.cedula),
            detail("Centro de operación", &w.centro_de_operacion),
            detail("Cargo", &w.cargo),
            detail("Empresa", &w.empresa),
            detail("Contacto", &w.contacto),
        ],
        None => vec![Line::from(Span::styled(
            "Sin búsqueda",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    let worker = Paragraph::new(Text::from(worker_lines))
        .block(field_block(" Trabajador ", false));
    f.render_widget(worker, chunks[1]);

    let mut lines: Vec<Line> = Vec::new();
    for row in app.history.rows() {
        lines.push(Line::from(Span::styled(
            format!("Entrega #{}", row.number),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(detail("  Fecha", &row.fecha));
        lines.push(detail("  EPP Entregado", &row.epp_entregado));
        lines.push(detail("  Unidades", &row.unidades));
        lines.push(detail("  Referencia/Tipo", &row.referencia_tipo));
        lines.push(detail("  Nombre Quien Entrega", &row.nombre_hs_entrega));
        lines.push(detail("  Tarea/Labor", &row.tarea_labor));
        lines.push(Line::from(""));
    }
    let deliveries = Paragraph::new(Text::from(lines))
        .block(field_block(" Entregas ", false))
        .wrap(Wrap { trim: false })
        .scroll((app.history_scroll, 0));
    f.render_widget(deliveries, chunks[2]);

    let (text, style) = match &app.status {
        Some(notice) => status_line(notice),
        None => (
            " Enter buscar | Ctrl+P descargar PDF | ↑/↓ desplazar | F2 registro | Ctrl+C salir"
                .to_string(),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ),
    };
    f.render_widget(Paragraph::new(text).style(style), chunks[3]);
}

fn detail(label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{}: ", label),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value.to_string()),
    ])
}

fn status_line(notice: &Notice) -> (String, Style) {
    let bg = if notice.is_error() {
        Color::Red
    } else {
        Color::Green
    };
    (
        format!(" {} (Esc)", notice),
        Style::default().fg(Color::White).bg(bg),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_pad_maps_inside_area() {
        let area = Rect::new(10, 5, 50, 10);

        let p = cell_to_pad(area, 10, 5, 500, 200).unwrap();
        assert_eq!(p, Point::new(5.0, 10.0));

        let p = cell_to_pad(area, 59, 14, 500, 200).unwrap();
        assert_eq!(p, Point::new(495.0, 190.0));
    }

    #[test]
    fn test_cell_to_pad_outside_area() {
        let area = Rect::new(10, 5, 50, 10);
        assert!(cell_to_pad(area, 9, 5, 500, 200).is_none());
        assert!(cell_to_pad(area, 60, 5, 500, 200).is_none());
        assert!(cell_to_pad(area, 20, 15, 500, 200).is_none());
        assert!(cell_to_pad(Rect::default(), 0, 0, 500, 200).is_none());
    }

    #[test]
    fn test_register_layout_has_a_box_per_field() {
        let layout = register_layout(Rect::new(0, 0, 120, 40));
        assert_eq!(layout.fields.len(), FIELDS.len());
        assert!(layout.signature.height >= 6);
        assert_eq!(layout.status.height, 1);
    }

    #[test]
    fn test_inner_shrinks_by_border() {
        assert_eq!(inner(Rect::new(2, 3, 10, 6)), Rect::new(3, 4, 8, 4));
        assert_eq!(inner(Rect::new(0, 0, 1, 1)).width, 0);
    }
}
