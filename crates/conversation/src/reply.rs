//! Reply texts (Rioplatense Spanish, WhatsApp markup).

use chrono::{Datelike, NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use chatorder_customers::weekday_name;
use chatorder_orders::OrderLine;

const MONTHS: [&str; 12] = [
    "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
    "octubre", "noviembre", "diciembre",
];

/// `2.500` → `2.5`, `20` → `20`.
pub fn format_quantity(quantity: Decimal) -> String {
    quantity.normalize().to_string()
}

/// One `* NAME x qty UNIT` row per line, or `(sin ítems)`.
pub fn lines_block(lines: &[OrderLine]) -> String {
    if lines.is_empty() {
        return "(sin ítems)".to_string();
    }
    lines
        .iter()
        .map(|line| {
            format!(
                "* {} x {} {}",
                line.product_name.to_uppercase(),
                format_quantity(line.quantity),
                line.unit.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `miércoles 22 de octubre`
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "{} {} de {}",
        weekday_name(date.weekday()),
        date.day(),
        MONTHS[date.month0() as usize]
    )
}

fn hh_mm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

fn greeting(name: &str, warm: bool) -> String {
    match (warm, name.is_empty()) {
        (true, false) => format!("¡Hola {name}! "),
        (true, true) => "¡Hola! ".to_string(),
        (false, false) => format!("Hola {name}. "),
        (false, true) => "Hola. ".to_string(),
    }
}

/// The next order-taking window, in local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextWindow {
    /// The day orders are taken on (the day before delivery).
    pub day: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Policy hours plus the next window, when one is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosedWindow {
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    pub next: Option<NextWindow>,
}

pub fn outside_window(name: &str, warm: bool, closed: &ClosedWindow) -> String {
    let mut reply = format!(
        "{}Tomamos pedidos *el día anterior* de {} a {}.",
        greeting(name, warm),
        hh_mm(closed.opens_at),
        hh_mm(closed.closes_at)
    );
    if let Some(next) = closed.next {
        reply.push_str(&format!(
            "\nPróxima ventana: *{} {}–{}*.",
            long_date(next.day),
            hh_mm(next.start),
            hh_mm(next.end)
        ));
    }
    reply
}

pub fn confirmed(name: &str, lines: &[OrderLine]) -> String {
    let name = if name.is_empty() { "gracias" } else { name };
    format!("¡Perfecto, {name}! Pedido confirmado ✅\n{}", lines_block(lines))
}

pub fn paused(name: &str) -> String {
    let name = if name.is_empty() { "todo bien" } else { name };
    format!("Ok, {name}. Decime qué corrijo o mandá *producto + cantidad*.")
}

pub fn removal_unmatched(description: &str) -> String {
    format!("No encontré \"{description}\" en tu pedido.")
}

pub fn removal_not_in_order() -> String {
    "Ese producto/unidad no está en tu pedido.".to_string()
}

pub fn removed(lines: &[OrderLine]) -> String {
    format!("Listo. ¿Así va?\n{}", lines_block(lines))
}

pub fn updated(lines: &[OrderLine]) -> String {
    format!("Actualicé tu pedido. ¿Confirmás?\n{}", lines_block(lines))
}

pub fn detected(lines: &[OrderLine]) -> String {
    format!("Detecté esto:\n{}\n¿Confirmás?", lines_block(lines))
}

pub fn not_sold(unknown: &[String]) -> String {
    let rows = unknown
        .iter()
        .map(|d| format!("* {d}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("No vendemos:\n{rows}\nMandá producto + cantidad del catálogo.")
}

pub fn correction_hint() -> String {
    "Decime qué corrijo (ej: \"sacá 2 cj milanesa de peceto\", \"agregame 2 cj milanesas\").".to_string()
}

pub fn welcome(name: &str) -> String {
    format!(
        "{}Decime producto + cantidad en una línea.\nEj: \"20kg picada especial\" · \"2 cj milanesas medianas\"",
        greeting(name, true)
    )
}

pub fn ask_for_items() -> String {
    "Decime *producto + cantidad* en una línea.".to_string()
}
