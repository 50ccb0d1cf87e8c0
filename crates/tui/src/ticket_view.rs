use ksrtc_core::{
    engine::{DATE_FORMAT, TIME_FORMAT},
    Ticket,
};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::app::Theme;

const WIDTH: usize = 80;

const TERMS: [&str; 4] = [
    "1. Please arrive at the bus station 30 minutes before departure",
    "2. Ticket is non-refundable",
    "3. Valid ID proof required during travel",
    "4. Smoking and drinking alcohol is prohibited",
];

/// Money is kept at full precision until it reaches the screen.
pub fn rupees(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("₹{rounded:.2}")
}

/// Per-kilometre rate exactly as configured, without rounding.
pub fn rate_per_km(rate: Decimal) -> String {
    format!("₹{rate}/km")
}

/// Printable layout of an issued ticket.
pub fn ticket_lines(ticket: &Ticket, theme: &Theme) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(theme.accent)
        .add_modifier(Modifier::BOLD);
    let rule = Style::default().fg(theme.muted);
    let plain = Style::default().fg(theme.primary_fg);

    let request = &ticket.request;
    let fare = &ticket.fare;
    let mut lines = Vec::new();
    let mut push = |text: String, style: Style| lines.push(Line::from(Span::styled(text, style)));

    push("=".repeat(WIDTH), rule);
    push(centered("KARNATAKA STATE ROAD TRANSPORT CORPORATION"), heading);
    push(centered("BUS TICKET"), heading);
    push("=".repeat(WIDTH), rule);
    push(
        format!(
            "Ticket Number: {:>20}    Date: {}",
            ticket.ticket_number,
            ticket.issued_at.format(DATE_FORMAT)
        ),
        plain,
    );
    push(
        format!(
            "Bus Number: {:>23}    Time: {}",
            ticket.bus_number,
            ticket.issued_at.format(TIME_FORMAT)
        ),
        plain,
    );
    push("-".repeat(WIDTH), rule);
    push(
        format!("From: {:<20} To: {:<20}", request.origin, request.destination),
        plain,
    );
    push(
        format!(
            "Travel Date: {:<15} Travel Time: {}",
            request.travel_date.format(DATE_FORMAT).to_string(),
            request.travel_time.format(TIME_FORMAT)
        ),
        plain,
    );
    push(
        format!(
            "Bus Type: {:<18} Distance: {} km",
            request.bus_type.name, fare.distance_km
        ),
        plain,
    );
    push(format!("Amenities: {}", request.bus_type.amenities), plain);

    push("-".repeat(WIDTH), rule);
    push("PASSENGER DETAILS:".to_string(), heading);
    push("-".repeat(WIDTH), rule);
    push(
        format!("{:<20} {:<5} {:<8} {:<6}", "Name", "Age", "Gender", "Seat"),
        heading,
    );
    push("-".repeat(40), rule);
    for passenger in &request.passengers {
        push(
            format!(
                "{:<20} {:<5} {:<8} {:<6}",
                passenger.name,
                passenger.age,
                passenger.gender.as_str(),
                passenger.seat
            ),
            plain,
        );
    }

    push("-".repeat(WIDTH), rule);
    push("FARE BREAKDOWN:".to_string(), heading);
    push("-".repeat(WIDTH), rule);
    push(
        format!(
            "Base Fare ({} passengers): {}",
            fare.passenger_count,
            rupees(fare.base_fare)
        ),
        plain,
    );
    push(format!("Service Tax (5%): {}", rupees(fare.service_tax)), plain);
    push(
        format!("Total Amount: {}", rupees(fare.total_amount)),
        heading,
    );

    push("-".repeat(WIDTH), rule);
    push(format!("Contact: {}", request.mobile), plain);
    if let Some(email) = &request.email {
        push(format!("Email: {email}"), plain);
    }

    push("-".repeat(WIDTH), rule);
    push("TERMS & CONDITIONS:".to_string(), heading);
    for term in TERMS {
        push(term.to_string(), plain);
    }
    push("=".repeat(WIDTH), rule);
    push(centered("Thank you for choosing KSRTC!"), heading);
    push(centered("Have a safe journey!"), heading);
    push("=".repeat(WIDTH), rule);
    lines
}

fn centered(text: &str) -> String {
    format!("{text:^WIDTH$}").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use ksrtc_core::{
        models::{FareBreakdown, Gender, Passenger},
        BookingRequest, BusType,
    };

    fn text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn sample(email: Option<&str>) -> Ticket {
        let issued_at = NaiveDate::from_ymd_opt(2026, 10, 18)
            .and_then(|date| date.and_hms_opt(16, 5, 0))
            .expect("valid timestamp");
        Ticket {
            ticket_number: "KSRTC12345678".to_string(),
            bus_number: "KA01F2345".to_string(),
            issued_at,
            request: BookingRequest {
                origin: "Bangalore".to_string(),
                destination: "Kolar".to_string(),
                bus_type: BusType::new("Ordinary", Decimal::new(12, 1), "Basic seating"),
                travel_date: NaiveDate::from_ymd_opt(2026, 11, 2).expect("valid date"),
                travel_time: NaiveTime::from_hms_opt(7, 5, 0).expect("valid time"),
                passengers: vec![Passenger {
                    name: "Asha".to_string(),
                    age: 29,
                    gender: Gender::Female,
                    seat: "S01".to_string(),
                }],
                mobile: "9876543210".to_string(),
                email: email.map(str::to_string),
            },
            fare: FareBreakdown {
                distance_km: 68,
                passenger_count: 1,
                base_fare: Decimal::new(816, 1),
                service_tax: Decimal::new(4080, 3),
                total_amount: Decimal::new(85680, 3),
            },
        }
    }

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(rupees(Decimal::new(630, 0)), "₹630.00");
        assert_eq!(rupees(Decimal::new(4080, 3)), "₹4.08");
        assert_eq!(rupees(Decimal::new(12345, 3)), "₹12.35");
    }

    #[test]
    fn rates_keep_their_configured_precision() {
        assert_eq!(rate_per_km(Decimal::new(12, 1)), "₹1.2/km");
        assert_eq!(rate_per_km(Decimal::new(20, 1)), "₹2.0/km");
        assert_eq!(rate_per_km(Decimal::new(75, 2)), "₹0.75/km");
    }

    #[test]
    fn ticket_shows_fare_breakdown_and_stamps() {
        let lines: Vec<String> = ticket_lines(&sample(None), &Theme::default())
            .iter()
            .map(text)
            .collect();

        assert!(lines.iter().any(|line| line.contains("KSRTC12345678") && line.ends_with("Date: 18-10-2026")));
        assert!(lines.iter().any(|line| line.ends_with("Time: 16:05")));
        assert!(lines.iter().any(|line| line == "Base Fare (1 passengers): ₹81.60"));
        assert!(lines.iter().any(|line| line == "Service Tax (5%): ₹4.08"));
        assert!(lines.iter().any(|line| line == "Total Amount: ₹85.68"));
        assert!(lines.iter().any(|line| line.starts_with("Asha") && line.contains("FEMALE") && line.contains("S01")));
        assert!(!lines.iter().any(|line| line.starts_with("Email:")));
    }

    #[test]
    fn email_is_printed_when_given() {
        let lines: Vec<String> = ticket_lines(&sample(Some("asha@example.com")), &Theme::default())
            .iter()
            .map(text)
            .collect();
        assert!(lines.iter().any(|line| line == "Email: asha@example.com"));
    }
}
