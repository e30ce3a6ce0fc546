use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mkly_editor_engine::{Compiler, EditorSession};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{io::stdout, path::Path};

use crate::report;

struct App<C: Compiler> {
    session: EditorSession<C>,
    title: String,
    source_state: ListState,
    source_lines: Vec<String>,
    inspector: Vec<String>,
}

impl<C: Compiler> App<C> {
    fn new(session: EditorSession<C>, title: String) -> Self {
        let source_lines = session.source().split('\n').map(str::to_string).collect();
        let mut app = Self {
            session,
            title,
            source_state: ListState::default(),
            source_lines,
            inspector: Vec::new(),
        };
        app.update_inspector();
        app
    }

    fn next_line(&mut self) {
        let line = self.session.cursor_line() + 1;
        self.session.set_cursor(line);
        self.update_inspector();
    }

    fn previous_line(&mut self) {
        let line = self.session.cursor_line().saturating_sub(1);
        self.session.set_cursor(line);
        self.update_inspector();
    }

    fn update_inspector(&mut self) {
        let cursor = self.session.cursor_line();
        self.source_state.select(Some(cursor - 1));

        self.inspector = match self.session.cursor_block() {
            Some(block) => report::describe_block(&block, self.session.style_graph()),
            None => vec![format!("No block at line {cursor}")],
        };

        let diagnostics = self.session.diagnostics();
        if !diagnostics.is_empty() {
            self.inspector.push(String::new());
            self.inspector
                .extend(diagnostics.iter().map(report::describe_diagnostic));
        }
    }
}

pub fn run<C: Compiler>(session: EditorSession<C>, path: &Path) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, path.display().to_string());
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend, C: Compiler>(
    terminal: &mut Terminal<B>,
    app: &mut App<C>,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_line(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_line(),
                _ => {}
            }
        }
    }
}

fn ui<C: Compiler>(f: &mut Frame, app: &mut App<C>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
        .split(f.area());
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
        .split(rows[0]);

    // Source panel
    let width = app.source_lines.len().to_string().len();
    let source_items: Vec<ListItem> = app
        .source_lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            let number = format!("{:>width$} ", idx + 1);
            ListItem::new(Line::from(vec![
                Span::styled(number, Style::default().fg(Color::DarkGray)),
                Span::raw(line.clone()),
            ]))
        })
        .collect();

    let source = List::new(source_items)
        .block(Block::default().borders(Borders::ALL).title(app.title.clone()))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(source, chunks[0], &mut app.source_state);

    // Inspector panel
    let inspector_text: Vec<Line> = app
        .inspector
        .iter()
        .map(|line| Line::from(vec![Span::raw(line.clone())]))
        .collect();

    let inspector = Paragraph::new(inspector_text)
        .block(Block::default().borders(Borders::ALL).title("Inspector"))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(inspector, chunks[1]);

    let help = Paragraph::new(Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous line | "),
        Span::raw("↓/j: Next line"),
    ]));

    f.render_widget(help, rows[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "--- use: core\n\n--- core/text\nsize: 2\n\nHello\n--- /core/quote";

    fn app() -> App<mkly_editor_engine::StyleOnlyCompiler> {
        App::new(EditorSession::from_source(DOC), "page.mkly".to_string())
    }

    #[test]
    fn cursor_moves_within_the_document() {
        let mut app = app();
        assert_eq!(app.source_state.selected(), Some(0));
        app.previous_line();
        assert_eq!(app.session.cursor_line(), 1);

        for _ in 0..20 {
            app.next_line();
        }
        assert_eq!(app.session.cursor_line(), 7);
        assert_eq!(app.source_state.selected(), Some(6));
    }

    #[test]
    fn inspector_follows_the_cursor() {
        let mut app = app();
        app.next_line();
        app.next_line();
        assert_eq!(app.inspector[0], "core/text (lines 3-6)");
        assert!(app.inspector.contains(&"  size: 2".to_string()));
        assert_eq!(
            app.inspector.last().map(String::as_str),
            Some("warning: line 7: Closing tag '--- /core/quote' has no open block")
        );
    }
}
