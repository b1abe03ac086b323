//! ESC/POS receipt emission.
//!
//! Tickets are built as a plain byte stream (initialize, justification,
//! emphasis, font select, text, feed, cut) and written to the configured
//! endpoint: a local device path or a tcp://host:port socket. There is no
//! retry; an unreachable printer surfaces as a dependency failure.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Order, OrderLine};
use std::io::Write;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;

const LINE_WIDTH: usize = 32;
const NAME_WIDTH: usize = 22;

#[derive(Debug, Clone, Copy)]
pub enum Justify {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy)]
pub enum Font {
    A,
    B,
}

pub struct TicketBuilder {
    buf: Vec<u8>,
}

impl TicketBuilder {
    pub fn new() -> Self {
        // ESC @ resets the printer state
        TicketBuilder {
            buf: vec![ESC, b'@'],
        }
    }

    pub fn justify(&mut self, j: Justify) -> &mut Self {
        let n = match j {
            Justify::Left => 0,
            Justify::Center => 1,
            Justify::Right => 2,
        };
        self.buf.extend_from_slice(&[ESC, b'a', n]);
        self
    }

    pub fn emphasis(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'E', on as u8]);
        self
    }

    pub fn font(&mut self, f: Font) -> &mut Self {
        let n = match f {
            Font::A => 0,
            Font::B => 1,
        };
        self.buf.extend_from_slice(&[ESC, b'M', n]);
        self
    }

    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.buf.push(b'\n');
        self
    }

    pub fn rule(&mut self, c: char) -> &mut Self {
        let s: String = std::iter::repeat(c).take(LINE_WIDTH).collect();
        self.line(&s)
    }

    pub fn feed(&mut self, n: u8) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, b'd', n]);
        self
    }

    pub fn cut(&mut self) -> &mut Self {
        // GS V A 3: partial cut after a small feed
        self.buf.extend_from_slice(&[GS, b'V', b'A', 3]);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for TicketBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn pad_right(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

fn pad_left(s: &str, width: usize) -> String {
    format!("{:>width$}", s, width = width)
}

/// Greedy word wrap; words longer than the width are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let (head, tail) = word.split_at(width);
            lines.push(head.to_string());
            word = tail;
        }
        if current.is_empty() {
            current = word.to_string();
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn item_lines(t: &mut TicketBuilder, name: &str, item_type: &str, qty: i64, line_total: f64) {
    let name: String = name.chars().take(NAME_WIDTH).collect();
    let label = if item_type.is_empty() {
        name
    } else {
        format!("{}({})", name, item_type)
    };

    for (index, line) in wrap(&label, NAME_WIDTH).iter().enumerate() {
        if index == 0 {
            let line_text = pad_right(line, 24);
            let qty_text = pad_right(&format!("x{}", qty), 5);
            let price_text = pad_left(&format!("Rs.{:.0}", line_total), 10);
            t.font(Font::B);
            t.line(&format!("{}{}{}", line_text, qty_text, price_text));
            t.font(Font::A);
        } else {
            t.line(line);
        }
    }
    t.line("");
}

/// Customer receipt printed at bill finalization.
pub fn render_receipt(config: &Config, order: &Order, cash: f64, change: f64) -> Vec<u8> {
    let mut t = TicketBuilder::new();

    t.justify(Justify::Center);
    t.line(&config.shop_name);
    t.rule('-');

    t.justify(Justify::Left);
    t.line(&format!("ORDER ID   : #{}", pad_right(&order.order_id, 8)));
    t.line(&format!(
        "DATE       : {}",
        chrono::Local::now().format("%d/%m/%Y %H:%M")
    ));
    t.line(&format!("TYPE       : {}", order.order_type.to_uppercase()));

    if order.order_type == "dine_in" {
        if let Some(table) = &order.table_no {
            t.line(&format!("TABLE      : {}", table.to_uppercase()));
        }
    }
    if let Some(phone) = &order.customer_phone {
        t.line(&format!("PHONE      : {}", phone));
    }
    t.rule('-');

    for item in &order.items {
        item_lines(&mut t, &item.item_name, &item.item_type, item.qty, item.line_total);
    }

    t.rule('-');
    t.justify(Justify::Right);
    t.line(&format!("TOTAL   : RS.{:<8.0}", order.total_bill));
    if order.discount > 0.0 {
        t.line(&format!("DISCOUNT   : -RS.{:<8.0}", order.discount));
    }
    if order.service_charges > 0.0 {
        t.line(&format!("SERVICE CHARGES   : RS.{:<8.0}", order.service_charges));
    }
    if order.delivery_charges > 0.0 {
        t.line(&format!("DELIVERY CHARGES   : RS.{:<8.0}", order.delivery_charges));
    }
    t.rule('=');
    t.emphasis(true);
    t.line(&format!("NET TOTAL   : RS.{:<8.0}", order.net_bill));
    t.emphasis(false);
    t.rule('=');
    t.line(&format!("CASH RECEIVED   : RS.{:<8.0}", cash));
    t.line(&format!("CHANGE        : RS.{:<8.0}", change));

    t.feed(1);
    t.justify(Justify::Center);
    for footer_line in &config.shop_footer {
        t.line(footer_line);
    }
    t.feed(2);
    t.cut();

    t.into_bytes()
}

/// Kitchen ticket: header, order info and item lines only, no totals block.
/// Fields come from an ad-hoc payload and default to empty/zero when absent.
pub fn render_kitchen_ticket(
    config: &Config,
    order_id: &str,
    order_type: &str,
    table_no: Option<&str>,
    customer_phone: Option<&str>,
    items: &[OrderLine],
) -> Vec<u8> {
    let mut t = TicketBuilder::new();

    t.justify(Justify::Center);
    t.emphasis(true);
    t.line(&config.shop_name);
    t.emphasis(false);
    t.rule('-');

    t.justify(Justify::Left);
    t.line(&format!("ORDER ID   : #{}", pad_left(order_id, 8)));
    t.line(&format!(
        "DATE       : {}",
        chrono::Local::now().format("%d/%m/%Y %H:%M")
    ));
    t.line(&format!("TYPE       : {}", order_type.to_uppercase()));
    if order_type == "dine_in" {
        if let Some(table) = table_no {
            t.line(&format!("TABLE      : {}", table.to_uppercase()));
        }
    }
    if let Some(phone) = customer_phone {
        t.line(&format!("PHONE      : {}", phone));
    }
    t.rule('-');

    if items.is_empty() {
        t.line("No items found");
    } else {
        for item in items {
            item_lines(&mut t, &item.item_name, &item.item_type, item.qty, item.line_total);
        }
    }

    t.feed(2);
    t.cut();

    t.into_bytes()
}

/// Write a rendered ticket to the configured endpoint.
pub fn print(config: &Config, bytes: &[u8]) -> Result<(), AppError> {
    let endpoint = config
        .printer
        .as_deref()
        .ok_or_else(|| AppError::Dependency("Printer not configured".to_string()))?;

    if let Some(addr) = endpoint.strip_prefix("tcp://") {
        let mut stream = std::net::TcpStream::connect(addr).map_err(|e| {
            AppError::Dependency(format!("Printer not available or printing failed: {}", e))
        })?;
        stream.write_all(bytes).map_err(|e| {
            AppError::Dependency(format!("Printer not available or printing failed: {}", e))
        })?;
    } else {
        let mut device = std::fs::OpenOptions::new()
            .write(true)
            .open(endpoint)
            .map_err(|e| {
                AppError::Dependency(format!("Printer not available or printing failed: {}", e))
            })?;
        device.write_all(bytes).map_err(|e| {
            AppError::Dependency(format!("Printer not available or printing failed: {}", e))
        })?;
    }

    Ok(())
}
