use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::Line,
    widgets::{Block, Cell, Clear, Paragraph, Row, Table},
};

use crate::engine::TableView;
use crate::model::{Model, Modus};
use crate::sort::Direction;

pub const TABLE_HEADER_HEIGHT: u16 = 1;

pub struct ReviewUi;

impl ReviewUi {
    pub fn new() -> Self {
        ReviewUi
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let [content, footer, statusline] = Layout::vertical([
            Constraint::Min(TABLE_HEADER_HEIGHT + 2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        match model.modus() {
            Modus::Facet => self.draw_facets(model, frame, content),
            _ => self.draw_table(model, frame, content),
        }
        self.draw_footer(model, frame, footer);
        self.draw_statusline(model, frame, statusline);

        if model.modus() == Modus::Popup {
            self.draw_popup(model, frame);
        }
    }

    fn header_cells<'a>(&self, model: &'a Model) -> Vec<Cell<'a>> {
        let view = model.view();
        let (_, curser_column) = model.curser();
        let sorted_column = view
            .sort
            .as_ref()
            .and_then(|sort| model.column_keys().iter().position(|k| *k == sort.key));

        view.headers
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                let marker = match (sorted_column == Some(idx), view.sort.as_ref()) {
                    (true, Some(sort)) => match sort.direction {
                        Direction::Ascending => " ▲",
                        Direction::Descending => " ▼",
                    },
                    _ => "",
                };
                let mut style = Style::default().add_modifier(Modifier::BOLD);
                if idx == curser_column {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                Cell::from(format!("{label}{marker}")).style(style)
            })
            .collect()
    }

    fn draw_table(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let view = model.view();
        let (curser_row, _) = model.curser();
        let block = Block::bordered()
            .title(Line::from(format!(" {} ", model.assignment().name).bold()))
            .border_set(border::PLAIN);

        if view.rows.is_empty() {
            let empty = Paragraph::new("No results").centered().block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(self.header_cells(model)).height(TABLE_HEADER_HEIGHT);
        let rows = view.rows.iter().enumerate().map(|(idx, cells)| {
            let row = Row::new(cells.iter().map(|c| Cell::from(c.as_str())));
            if idx == curser_row {
                row.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                row
            }
        });

        let table = Table::new(rows, column_widths(view)).header(header).block(block);
        frame.render_widget(table, area);
    }

    fn draw_facets(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let facets = model.facet_rows();
        let curser = model.facet_curser();

        let header = Row::new(vec!["", "Status", "Count"]).bold().height(1);
        let rows = facets.iter().enumerate().map(|(idx, facet)| {
            let mark = if facet.active { "[x]" } else { "[ ]" };
            let row = Row::new(vec![
                Cell::from(mark),
                Cell::from(facet.label.as_str()),
                Cell::from(facet.count.to_string()),
            ]);
            if idx == curser {
                row.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                row
            }
        });

        let table = Table::new(
            rows,
            [Constraint::Length(3), Constraint::Fill(1), Constraint::Length(6)],
        )
        .header(header)
        .block(
            Block::bordered()
                .title(Line::from(" Filter by status ".bold()))
                .title_bottom(Line::from(" Enter toggles, Esc closes ").centered())
                .border_set(border::PLAIN),
        );
        frame.render_widget(table, area);
    }

    fn draw_footer(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let view = model.view();
        let mut parts = vec![format!(
            "Page {}/{}  rows {}/{}  size {}",
            view.page_index + 1,
            view.page_count,
            view.filtered,
            view.total,
            view.page_size
        )];
        if let Some(sort) = view.sort.as_ref() {
            let direction = match sort.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            parts.push(format!("sort {} {}", sort.key, direction));
        }
        if view.has_filters {
            parts.push("filtered (r resets)".to_string());
        }
        frame.render_widget(Line::from(parts.join("  |  ")), area);
    }

    fn draw_statusline(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let line = if model.modus() == Modus::Input {
            let input = model.input_state();
            Line::from(vec![
                format!("{}: ", input.prompt).bold(),
                input.input.clone().into(),
                "▏".into(),
            ])
        } else {
            Line::from(model.status_message().to_string().yellow())
        };
        frame.render_widget(line, area);
    }

    fn draw_popup(&self, model: &Model, frame: &mut Frame) {
        let area = centered(frame.area(), 60, 18);
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(model.popup_text()).block(block), area);
    }
}

fn column_widths(view: &TableView) -> Vec<Constraint> {
    view.headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let content = view
                .rows
                .iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0);
            // Header may carry a two-char sort marker
            Constraint::Length(std::cmp::max(header.chars().count() + 2, content) as u16 + 1)
        })
        .collect()
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = std::cmp::min(width, area.width);
    let height = std::cmp::min(height, area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
