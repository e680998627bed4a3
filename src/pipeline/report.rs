//! Console reports for classification and ORB runs

use std::collections::BTreeMap;

use orb_stats::{DayStats, OrbStats, OrbSummary};

pub fn print_day_stats(all_stats: &[DayStats]) {
    println!("═══════════════════════════════════════════════════════════");
    println!("  DAY CLASSIFICATION");
    println!("═══════════════════════════════════════════════════════════");

    for stats in all_stats {
        println!(
            "{}  {:<10} conf {:.2}  O {:.5} H {:.5} L {:.5} C {:.5}  body {:.0}%",
            stats.date,
            stats.day_type.to_string(),
            stats.confidence,
            stats.open,
            stats.high,
            stats.low,
            stats.close,
            stats.body_pct * 100.0
        );
    }

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for stats in all_stats {
        *counts.entry(stats.day_type.to_string()).or_insert(0) += 1;
    }

    println!("───────────────────────────────────────────────────────────");
    println!("Distribution over {} sessions:", all_stats.len());
    for (day_type, count) in &counts {
        println!("  {:<10} {}", day_type, count);
    }
    println!("═══════════════════════════════════════════════════════════");
}

pub fn print_orb_report(daily: &[OrbStats], summary: &OrbSummary) {
    println!("═══════════════════════════════════════════════════════════");
    println!(
        "  ORB ANALYSIS: {} ({} min window)",
        summary.instrument, summary.window_minutes
    );
    println!("═══════════════════════════════════════════════════════════");

    for stats in daily {
        let breakout = match (stats.broke_high, stats.broke_low) {
            (true, true) => "both",
            (true, false) => "high",
            (false, true) => "low",
            (false, false) => "none",
        };
        let timing = match stats.breakout_time_mins {
            Some(mins) => format!("{:.0}m", mins),
            None => "-".to_string(),
        };
        println!(
            "{}  OR {:.5}-{:.5}  broke {:<4} ext {:.5} after {:<4} eff {:.2}",
            stats.date, stats.or_low, stats.or_high, breakout, stats.breakout_extension, timing,
            stats.efficiency_ratio
        );
    }

    println!("───────────────────────────────────────────────────────────");
    println!("  Sessions:        {}", summary.total_days);
    println!(
        "  High breakouts:  {} ({:.1}%)",
        summary.high_breakouts, summary.high_breakout_pct
    );
    println!(
        "  Low breakouts:   {} ({:.1}%)",
        summary.low_breakouts, summary.low_breakout_pct
    );
    println!("  Avg OR range:    {:.5}", summary.avg_or_range);
    println!("  Avg day range:   {:.5}", summary.avg_day_range);
    println!("  Avg OR/day:      {:.2}", summary.avg_or_to_day_ratio);
    println!("  Avg extension:   {:.5}", summary.avg_breakout_extension);
    println!("  Simulated P&L:   {:.5}", summary.total_pnl);
    println!("  Win rate:        {:.1}%", summary.win_rate);
    println!("  Profit factor:   {:.2}", summary.profit_factor);
    println!("═══════════════════════════════════════════════════════════");
}
