//! Text rendering of box scores and scoresheets.

use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use scorebook_engine::stats::{BattingLine, BoxScore, PitchingLine};
use scorebook_engine::views::ScoreSheet;
use scorebook_engine::vocabulary::Side;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn rate(value: Option<f64>, places: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.places$}"))
}

fn align_right_from(table: &mut Table, first: usize, columns: usize) {
    for i in first..columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

/// Runs and hits per side.
pub fn summary_table(box_score: &BoxScore) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Team").add_attribute(Attribute::Bold),
        Cell::new("R").fg(Color::Cyan),
        Cell::new("H"),
    ]);
    for side in [Side::Away, Side::Home] {
        table.add_row(vec![
            Cell::new(side.to_string()),
            Cell::new(box_score.runs(side)),
            Cell::new(box_score.hits(side)),
        ]);
    }
    align_right_from(&mut table, 1, 3);
    table
}

pub fn batting_table(lines: &[BattingLine]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Batter").add_attribute(Attribute::Bold),
        Cell::new("PA"),
        Cell::new("AB"),
        Cell::new("H"),
        Cell::new("2B"),
        Cell::new("3B"),
        Cell::new("HR"),
        Cell::new("BB"),
        Cell::new("HBP"),
        Cell::new("SO"),
        Cell::new("SF"),
        Cell::new("AVG").fg(Color::Cyan),
        Cell::new("OBP"),
        Cell::new("SLG"),
        Cell::new("OPS").fg(Color::Cyan),
        Cell::new("P/PA"),
    ]);
    for l in lines {
        table.add_row(vec![
            Cell::new(l.batting_order),
            Cell::new(&l.player_name),
            Cell::new(l.pa),
            Cell::new(l.ab),
            Cell::new(l.h),
            Cell::new(l.doubles),
            Cell::new(l.triples),
            Cell::new(l.hr),
            Cell::new(l.bb),
            Cell::new(l.hbp),
            Cell::new(l.so),
            Cell::new(l.sf),
            Cell::new(rate(l.avg, 3)),
            Cell::new(rate(l.obp, 3)),
            Cell::new(rate(l.slg, 3)),
            Cell::new(rate(l.ops, 3)),
            Cell::new(rate(l.ppa, 1)),
        ]);
    }
    align_right_from(&mut table, 2, 17);
    table
}

pub fn pitching_table(lines: &[PitchingLine]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Pitcher").add_attribute(Attribute::Bold),
        Cell::new("Inn"),
        Cell::new("IP").fg(Color::Cyan),
        Cell::new("BF"),
        Cell::new("P"),
        Cell::new("H"),
        Cell::new("SO"),
        Cell::new("BB"),
        Cell::new("HBP"),
        Cell::new("OAVG"),
        Cell::new("WHIP").fg(Color::Cyan),
        Cell::new("K/9"),
        Cell::new("BB/9"),
        Cell::new("K/BB"),
    ]);
    for l in lines {
        table.add_row(vec![
            Cell::new(&l.player_name),
            Cell::new(format!("{}-{}", l.from_inning, l.to_inning)),
            Cell::new(&l.ip_display),
            Cell::new(l.bfp),
            Cell::new(l.pitches),
            Cell::new(l.h),
            Cell::new(l.so),
            Cell::new(l.bb),
            Cell::new(l.hbp),
            Cell::new(rate(l.opp_avg, 3)),
            Cell::new(rate(l.whip, 2)),
            Cell::new(rate(l.k9, 1)),
            Cell::new(rate(l.bb9, 1)),
            Cell::new(rate(l.kbb, 2)),
        ]);
    }
    align_right_from(&mut table, 2, 14);
    table
}

/// One row per batting slot, one column per displayed inning. The current
/// batter's slot is marked with `>`.
pub fn score_sheet_table(sheet: &ScoreSheet) -> Table {
    let mut table = new_table();
    let mut header = vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Player").add_attribute(Attribute::Bold),
        Cell::new("Pos"),
    ];
    header.extend((1..=sheet.innings).map(Cell::new));
    table.set_header(header);

    for row in &sheet.rows {
        let marker = if row.is_current_batter { ">" } else { "" };
        let mut cells = vec![
            Cell::new(format!("{marker}{}", row.batting_order)),
            Cell::new(row.player_name.as_deref().unwrap_or("")),
            Cell::new(row.position.as_deref().unwrap_or("")),
        ];
        cells.extend(row.cells.iter().map(|cell| match cell {
            Some(c) if c.is_out => Cell::new(&c.label).fg(Color::Red),
            Some(c) => Cell::new(&c.label),
            None => Cell::new(""),
        }));
        table.add_row(cells);
    }
    table
}

/// Everything `box-score` prints, in order.
pub fn render_box_score(box_score: &BoxScore) -> String {
    let mut out = String::new();
    out.push_str(&summary_table(box_score).to_string());
    for side in [Side::Away, Side::Home] {
        out.push_str(&format!("\n\n{side} batting\n"));
        out.push_str(&batting_table(box_score.batting(side)).to_string());
        out.push_str(&format!("\n\n{side} pitching\n"));
        out.push_str(&pitching_table(box_score.pitching(side)).to_string());
    }
    out.push('\n');
    out
}
