// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

#[derive(Clone, Copy, Debug, Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

impl Pen {
    fn style<W: Write>(&mut self, out: &mut W, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }

    fn move_to<W: Write>(&mut self, out: &mut W, x: u16, y: u16) -> Result<()> {
        if self.pos != Some((x, y)) {
            out.queue(cursor::MoveTo(x, y))?;
        }
        Ok(())
    }

    fn advance(&mut self, x: u16, y: u16, len: u16, width: u16) {
        let next = x.saturating_add(len);
        self.pos = (next < width).then_some((next, y));
    }
}

// Diff writer: remembers what was last sent and repaints only cells that
// changed, coalescing same-style neighbours on a row into one print.
struct Painter<W: Write> {
    out: W,
    width: u16,
    height: u16,
    sent: Option<Vec<Cell>>,
    run: String,
    rows: Vec<Vec<usize>>,
}

impl<W: Write> Painter<W> {
    fn new(out: W) -> Self {
        Self {
            out,
            width: 0,
            height: 0,
            sent: None,
            run: String::with_capacity(64),
            rows: Vec::new(),
        }
    }

    fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let resized = self.sent.is_none() || self.width != frame.width || self.height != frame.height;
        if resized {
            self.out.queue(terminal::Clear(terminal::ClearType::All))?;
            self.width = frame.width;
            self.height = frame.height;
            self.sent = Some(vec![Cell::BLANK; frame.width as usize * frame.height as usize]);
        }

        let total = frame.width as usize * frame.height as usize;
        let many = total > 0 && frame.dirty_indices().len() >= total / 3;
        let mut pen = Pen::default();

        if resized || frame.is_dirty_all() || many {
            self.repaint_all(frame, &mut pen)?;
        } else {
            self.repaint_dirty(frame, &mut pen)?;
        }

        self.out.queue(SetAttribute(Attribute::Reset))?;
        self.out.queue(ResetColor)?;
        self.out.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn repaint_all(&mut self, frame: &Frame, pen: &mut Pen) -> Result<()> {
        let Some(sent) = self.sent.as_mut() else {
            return Ok(());
        };
        for y in 0..frame.height {
            self.out.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                pen.style(&mut self.out, &cell)?;
                self.out.queue(Print(cell.ch))?;
                sent[idx] = cell;
            }
        }
        Ok(())
    }

    fn repaint_dirty(&mut self, frame: &Frame, pen: &mut Pen) -> Result<()> {
        let Some(sent) = self.sent.as_mut() else {
            return Ok(());
        };
        let width = frame.width as usize;
        if self.rows.len() != frame.height as usize {
            self.rows = vec![Vec::new(); frame.height as usize];
        }
        for &idx in frame.dirty_indices() {
            if let Some(row) = self.rows.get_mut(idx / width) {
                row.push(idx);
            }
        }

        for (y, row) in self.rows.iter_mut().enumerate() {
            if row.is_empty() {
                continue;
            }
            row.sort_unstable();
            let y = y as u16;
            let mut i = 0;
            while i < row.len() {
                let start = row[i];
                let head = frame.cell_at_index(start);
                if sent[start] == head {
                    i += 1;
                    continue;
                }
                sent[start] = head;

                self.run.clear();
                self.run.push(head.ch);
                let mut end = start;
                let mut j = i + 1;
                while j < row.len() && row[j] == end + 1 {
                    let next = frame.cell_at_index(row[j]);
                    if sent[row[j]] == next
                        || (next.fg, next.bg, next.bold) != (head.fg, head.bg, head.bold)
                    {
                        break;
                    }
                    sent[row[j]] = next;
                    self.run.push(next.ch);
                    end = row[j];
                    j += 1;
                }

                let x = (start % width) as u16;
                pen.move_to(&mut self.out, x, y)?;
                pen.style(&mut self.out, &head)?;
                self.out.queue(Print(self.run.as_str()))?;
                pen.advance(x, y, (end - start + 1) as u16, frame.width);
                i = j;
            }
            row.clear();
        }
        Ok(())
    }
}

pub struct Terminal {
    painter: Painter<Stdout>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init_res: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()?;
            Ok(())
        })();
        if let Err(e) = init_res {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            painter: Painter::new(out),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        self.painter.draw(frame)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(ch: char) -> Cell {
        Cell {
            ch,
            fg: Some(Color::Green),
            ..Cell::BLANK
        }
    }

    fn text(p: &mut Painter<Vec<u8>>) -> String {
        let s = String::from_utf8(p.out.clone()).unwrap();
        p.out.clear();
        s
    }

    #[test]
    fn first_draw_paints_every_cell() {
        let mut p = Painter::new(Vec::new());
        let mut f = Frame::new(4, 2);
        f.set(1, 0, glyph('x'));
        p.draw(&mut f).unwrap();
        let out = text(&mut p);
        assert!(out.contains('x'));
        assert_eq!(out.matches(' ').count(), 7);
        assert!(!f.has_changes());
    }

    #[test]
    fn unchanged_frame_prints_no_cells() {
        let mut p = Painter::new(Vec::new());
        let mut f = Frame::new(4, 2);
        p.draw(&mut f).unwrap();
        text(&mut p);

        p.draw(&mut f).unwrap();
        let out = text(&mut p);
        assert!(!out.contains(' '));
    }

    #[test]
    fn adjacent_changes_share_one_run() {
        let mut p = Painter::new(Vec::new());
        let mut f = Frame::new(12, 3);
        p.draw(&mut f).unwrap();
        text(&mut p);

        f.set(2, 1, glyph('a'));
        f.set(3, 1, glyph('b'));
        p.draw(&mut f).unwrap();
        let out = text(&mut p);
        assert!(out.contains("ab"));
        // Cursor move is 1-based: row 2, column 3.
        assert!(out.contains("\x1b[2;3H"));
        assert_eq!(out.matches('H').count(), 1);
    }

    #[test]
    fn resize_triggers_a_clear() {
        let mut p = Painter::new(Vec::new());
        let mut f = Frame::new(4, 2);
        p.draw(&mut f).unwrap();
        text(&mut p);

        let mut bigger = Frame::new(6, 2);
        bigger.clear_dirty();
        p.draw(&mut bigger).unwrap();
        let out = text(&mut p);
        assert!(out.contains("\x1b[2J"));
        assert_eq!(out.matches(' ').count(), 12);
    }
}
