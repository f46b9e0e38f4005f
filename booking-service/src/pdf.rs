use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};

use abi::{format_time, format_time_or_na};

const HEADERS: [&str; 6] = ["ID", "Nome", "Email", "Data", "Ora", "Ospiti"];

const NAME_WIDTH: usize = 20;
const EMAIL_WIDTH: usize = 25;

// A4 portrait; positions in millimeters from the bottom-left corner
fn page_size() -> (Mm, Mm) {
    (Mm(210.0), Mm(297.0))
}

fn columns() -> [Mm; 6] {
    [Mm(18.0), Mm(28.0), Mm(70.0), Mm(123.0), Mm(148.0), Mm(169.0)]
}

pub struct ExportContext {
    pub title: String,
    pub file_name: String,
}

/// Title and download filename for the active filter: the special event when
/// one is selected, the brunch turn when filtering by (date, time), a generic
/// header otherwise.
pub fn export_context(
    filter: &abi::BookingFilter,
    event: Option<&abi::SpecialEvent>,
) -> ExportContext {
    if let Some(event) = event {
        return ExportContext {
            title: format!("Prenotazioni per: {}", event.display_name),
            file_name: format!(
                "prenotazioni_{}_{}",
                sanitize_filename(&event.display_name),
                event.booking_date.format("%Y-%m-%d")
            ),
        };
    }
    if let (Some(date), Some(time)) = (filter.event_date, filter.event_time) {
        return ExportContext {
            title: format!(
                "Prenotazioni Brunch del {} ore {}",
                date.format("%d/%m/%Y"),
                format_time(time)
            ),
            file_name: format!(
                "prenotazioni_brunch_{}_{}",
                date.format("%Y-%m-%d"),
                time.format("%H-%M")
            ),
        };
    }
    ExportContext {
        title: "Lista di tutte le Prenotazioni".to_string(),
        file_name: "prenotazioni_la_tavola".to_string(),
    }
}

/// Keep letters, digits and spaces; spaces become underscores.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .replace(' ', "_")
}

/// Render the export as a paginated table, one booking per row.
pub fn render(title: &str, bookings: &[abi::Booking]) -> Result<Vec<u8>, printpdf::Error> {
    let (width, height) = page_size();
    let (doc, page, layer) =
        PdfDocument::new("Lista Prenotazioni La Tavola", width, height, "bookings");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    let mut layer_ref = doc.get_page(page).get_layer(layer);
    layer_ref.use_text(title, 14.0, Mm(25.0), Mm(282.0), &font);
    title_rule(&layer_ref);
    header_row(&layer_ref, &font);

    let mut y = Mm(265.0);
    for booking in bookings {
        // run out of page, continue on a fresh one
        if y.0 < 18.0 {
            let (next_page, next_layer) = doc.add_page(width, height, "bookings");
            layer_ref = doc.get_page(next_page).get_layer(next_layer);
            y = Mm(282.0);
        }
        let cells = [
            booking.id.to_string(),
            truncate(&booking.name, NAME_WIDTH),
            truncate(&booking.email, EMAIL_WIDTH),
            booking.booking_date.format("%d/%m/%y").to_string(),
            format_time_or_na(booking.booking_time),
            booking.guests.to_string(),
        ];
        for (cell, x) in cells.iter().zip(columns()) {
            layer_ref.use_text(cell.as_str(), 10.0, x, y, &font);
        }
        y = Mm(y.0 - 5.5);
    }

    doc.save_to_bytes()
}

fn title_rule(layer: &PdfLayerReference) {
    let rule = Line {
        points: vec![
            (Point::new(Mm(25.0), Mm(280.0)), false),
            (Point::new(Mm(185.0), Mm(280.0)), false),
        ],
        is_closed: false,
    };
    layer.set_outline_thickness(0.75);
    layer.add_line(rule);
}

fn header_row(layer: &PdfLayerReference, font: &IndirectFontRef) {
    for (header, x) in HEADERS.iter().zip(columns()) {
        layer.use_text(*header, 11.0, x, Mm(272.0), font);
    }
}

fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}
