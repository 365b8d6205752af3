//! Inline XBRL serialisation of an assembled [`Document`].
//!
//! Rendering is a pure function of the document: it adds presentation
//! (labels, number formatting, tables) but never changes a fact. Only the
//! fact sequence and its context/unit bindings are contractual; the styling
//! here is not.

use std::fmt::Write;

use rust_decimal::Decimal;

use super::taxonomy::{Taxonomy, tags};
use crate::models::{Context, Document, Fact, FactValue, Period, Section, Sign, TagName, Unit};

/// Row labels for the tags the binder can emit. List-line amounts are
/// labelled by their own description fact instead.
static LABELS: &[(TagName, &str)] = &[
    (tags::COMPANY_NAME, "Company name"),
    (tags::REGISTRATION_NUMBER, "Company registration number"),
    (tags::TAX_REFERENCE, "Tax reference"),
    (tags::PERIOD_START, "Period start"),
    (tags::PERIOD_END, "Period end"),
    (tags::TURNOVER, "Turnover"),
    (tags::COST_OF_SALES, "Cost of sales"),
    (tags::GROSS_PROFIT, "Gross profit"),
    (tags::OTHER_OPERATING_INCOME, "Other operating income"),
    (tags::ADMINISTRATIVE_EXPENSES, "Administrative expenses"),
    (tags::DISTRIBUTION_COSTS, "Distribution costs"),
    (tags::OPERATING_PROFIT, "Operating profit"),
    (tags::INTEREST_RECEIVABLE, "Interest receivable and similar income"),
    (tags::INTEREST_PAYABLE, "Interest payable and similar charges"),
    (tags::PROFIT_BEFORE_TAX, "Profit before tax"),
    (tags::ACCOUNTING_PROFIT, "Profit per accounts"),
    (tags::DEPRECIATION_ADD_BACK, "Add: depreciation and amortisation"),
    (tags::DISALLOWED_ENTERTAINMENT, "Add: disallowable entertaining"),
    (tags::TOTAL_ADDITIONS, "Total additions"),
    (tags::CAPITAL_ALLOWANCES, "Less: capital allowances"),
    (tags::TOTAL_DEDUCTIONS, "Total deductions"),
    (tags::TAXABLE_PROFIT, "Profits chargeable to corporation tax"),
    (tags::TAX_RATE, "Corporation tax rate (%)"),
    (tags::TAX_DUE, "Corporation tax chargeable"),
    (tags::RD_CREDITS, "Less: R&D expenditure credits"),
    (tags::TOTAL_TAX_PAYABLE, "Tax payable"),
    (tags::LOSSES_BROUGHT_FORWARD, "Trading losses brought forward"),
    (tags::LOSSES_USED, "Trading losses used in period"),
    (tags::LOSSES_CARRIED_BACK, "Trading losses carried back"),
    (tags::LOSSES_CARRIED_FORWARD, "Trading losses carried forward"),
];

/// Typed-dimension domain element wrapping a line number.
const LINE_MEMBER_ELEMENT: &str = "ct-comp:LineNumber";

fn label(tag: TagName) -> String {
    LABELS
        .iter()
        .find(|(t, _)| *t == tag)
        .map_or_else(|| tag.local.to_string(), |(_, l)| (*l).to_string())
}

/// Renders `document` as an inline XBRL XHTML page.
pub fn render_ixbrl(
    document: &Document,
    taxonomy: &Taxonomy,
) -> String {
    let mut out = String::with_capacity(16 * 1024);
    // Writing to a String cannot fail.
    let _ = write_document(&mut out, document, taxonomy);
    out
}

fn write_document(
    out: &mut String,
    document: &Document,
    taxonomy: &Taxonomy,
) -> std::fmt::Result {
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    write!(out, r#"<html xmlns="http://www.w3.org/1999/xhtml""#)?;
    for (prefix, uri) in taxonomy.namespaces() {
        write!(out, r#" xmlns:{prefix}="{uri}""#)?;
    }
    writeln!(out, ">")?;

    writeln!(out, "<head>")?;
    writeln!(
        out,
        r#"<meta http-equiv="Content-Type" content="text/html; charset=UTF-8"/>"#
    )?;
    writeln!(out, "<title>{}</title>", escape(&document.header.title))?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;

    write_header(out, document)?;

    writeln!(out, "<h1>{}</h1>", escape(&document.header.title))?;
    for section in &document.sections {
        write_section(out, document, section)?;
    }

    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn write_header(
    out: &mut String,
    document: &Document,
) -> std::fmt::Result {
    writeln!(out, r#"<div style="display:none">"#)?;
    writeln!(out, "<ix:header>")?;

    writeln!(out, "<ix:references>")?;
    for schema in &document.header.schema_refs {
        writeln!(
            out,
            r#"<link:schemaRef xlink:type="simple" xlink:href="{}"/>"#,
            escape(schema)
        )?;
    }
    writeln!(out, "</ix:references>")?;

    writeln!(out, "<ix:resources>")?;
    for context in &document.contexts {
        write_context(out, context)?;
    }
    for unit in &document.units {
        write_unit(out, unit)?;
    }
    writeln!(out, "</ix:resources>")?;

    writeln!(out, "</ix:header>")?;
    writeln!(out, "</div>")
}

fn write_context(
    out: &mut String,
    context: &Context,
) -> std::fmt::Result {
    writeln!(out, r#"<xbrli:context id="{}">"#, escape(context.id.as_str()))?;
    writeln!(out, "<xbrli:entity>")?;
    writeln!(
        out,
        r#"<xbrli:identifier scheme="{}">{}</xbrli:identifier>"#,
        escape(&context.entity.scheme),
        escape(&context.entity.identifier)
    )?;
    if let Some(segment) = &context.segment {
        writeln!(
            out,
            r#"<xbrli:segment><xbrldi:typedMember dimension="{}"><{LINE_MEMBER_ELEMENT}>{}</{LINE_MEMBER_ELEMENT}></xbrldi:typedMember></xbrli:segment>"#,
            escape(&segment.dimension),
            escape(&segment.member)
        )?;
    }
    writeln!(out, "</xbrli:entity>")?;

    match context.period {
        Period::Duration { start, end } => writeln!(
            out,
            "<xbrli:period><xbrli:startDate>{start}</xbrli:startDate><xbrli:endDate>{end}</xbrli:endDate></xbrli:period>"
        )?,
        Period::Instant { date } => writeln!(
            out,
            "<xbrli:period><xbrli:instant>{date}</xbrli:instant></xbrli:period>"
        )?,
    }
    writeln!(out, "</xbrli:context>")
}

fn write_unit(
    out: &mut String,
    unit: &Unit,
) -> std::fmt::Result {
    writeln!(
        out,
        r#"<xbrli:unit id="{}"><xbrli:measure>{}</xbrli:measure></xbrli:unit>"#,
        escape(unit.id.as_str()),
        unit.measure.qualified_name()
    )
}

fn write_section(
    out: &mut String,
    document: &Document,
    section: &Section,
) -> std::fmt::Result {
    writeln!(out, "<h2>{}</h2>", escape(section.kind.title()))?;
    writeln!(out, "<table>")?;

    let mut facts = section.facts.iter().peekable();
    while let Some(fact) = facts.next() {
        // A description fact in a segment context labels the amount that
        // follows it in the same context.
        let is_line_label = matches!(fact.value, FactValue::Text(_))
            && document
                .context(&fact.context_ref)
                .is_some_and(|c| c.segment.is_some());
        let paired = facts
            .peek()
            .is_some_and(|next| next.context_ref == fact.context_ref && next.is_numeric());

        if is_line_label && paired {
            if let Some(amount) = facts.next() {
                write!(out, "<tr><td>")?;
                write_fact(out, fact)?;
                write!(out, "</td><td>")?;
                write_fact(out, amount)?;
                writeln!(out, "</td></tr>")?;
            }
            continue;
        }

        write!(out, "<tr><td>{}</td><td>", escape(&label(fact.name)))?;
        write_fact(out, fact)?;
        writeln!(out, "</td></tr>")?;
    }

    writeln!(out, "</table>")
}

fn write_fact(
    out: &mut String,
    fact: &Fact,
) -> std::fmt::Result {
    match &fact.value {
        FactValue::Text(text) => write!(
            out,
            r#"<ix:nonNumeric name="{}" contextRef="{}">{}</ix:nonNumeric>"#,
            fact.name,
            escape(fact.context_ref.as_str()),
            escape(text)
        ),
        FactValue::Date(date) => write!(
            out,
            r#"<ix:nonNumeric name="{}" contextRef="{}" format="ixt:date-day-monthname-year-en">{}</ix:nonNumeric>"#,
            fact.name,
            escape(fact.context_ref.as_str()),
            date.format("%-d %B %Y")
        ),
        FactValue::Monetary(amount) | FactValue::Ratio(amount) => {
            let negative = fact.sign == Sign::Negative;
            if negative {
                out.push('(');
            }
            write!(
                out,
                r#"<ix:nonFraction name="{}" contextRef="{}""#,
                fact.name,
                escape(fact.context_ref.as_str())
            )?;
            if let Some(unit) = &fact.unit_ref {
                write!(out, r#" unitRef="{}""#, escape(unit.as_str()))?;
            }
            if let Some(decimals) = fact.decimals {
                write!(out, r#" decimals="{decimals}""#)?;
            }
            write!(
                out,
                r#" scale="{}" format="ixt:num-dot-decimal""#,
                fact.scale
            )?;
            if negative {
                write!(out, r#" sign="-""#)?;
            }
            write!(
                out,
                ">{}</ix:nonFraction>",
                display_number(*amount, fact.scale)
            )?;
            if negative {
                out.push(')');
            }
            Ok(())
        }
    }
}

/// The displayed digits for a magnitude: value / 10^scale with thousands
/// separators.
fn display_number(
    amount: Decimal,
    scale: i32,
) -> String {
    let mut shown = amount.abs();
    for _ in 0..scale.unsigned_abs() {
        shown = if scale < 0 {
            shown * Decimal::TEN
        } else {
            shown / Decimal::TEN
        };
    }
    let text = shown.normalize().to_string();
    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w.to_string(), Some(f.to_string())),
        None => (text, None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) => format!("{grouped}.{f}"),
        None => grouped,
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
