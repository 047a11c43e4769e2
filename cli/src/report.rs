use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use tripweather_core::{CityCatalog, LeaderEntry, PipelineReport, Standings};

// Helper struct for Table Row
#[derive(Tabled)]
struct StandingRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Avg temp")]
    temp_avg: String,
    #[tabled(rename = "Dry hours")]
    hours: u32,
    #[tabled(rename = "Days")]
    days: usize,
}

#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "URL")]
    url: String,
}

pub fn leader_line(leader: &LeaderEntry) -> String {
    format!(
        "Best city for a trip: {}. Average temperature: {:.1}. Hours without precipitation: {}.",
        leader.city, leader.summary.temp_avg, leader.summary.relevant_cond_hours
    )
}

pub fn show_report(report: &PipelineReport) {
    for leader in &report.leaders {
        println!("{}", leader_line(leader));
    }

    if !report.dropped.is_empty() {
        let cities: Vec<String> = report
            .dropped
            .iter()
            .map(|d| format!("{} ({})", d.city, d.stage))
            .collect();
        println!(
            "\x1b[2m{} cities skipped: {}\x1b[0m",
            report.dropped.len(),
            cities.join(", ")
        );
    }
}

pub fn show_standings(standings: &Standings) {
    if standings.is_empty() {
        println!("No standings yet. Run `tripweather run` first.");
        return;
    }

    let rows: Vec<StandingRow> = standings
        .iter()
        .enumerate()
        .map(|(i, (city, entry))| StandingRow {
            rank: i + 1,
            city: city.to_string(),
            temp_avg: format!("{:.1}", entry.temp_avg),
            hours: entry.relevant_cond_hours,
            days: entry.days.len(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    println!("{}", table);
}

fn catalog_table(catalog: &CityCatalog) -> Table {
    let rows: Vec<CatalogRow> = catalog
        .iter()
        .map(|(city, query)| CatalogRow {
            city: city.to_string(),
            url: query.url.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table
}

pub fn show_catalog(catalog: &CityCatalog) {
    println!("{}", catalog_table(catalog));
}
