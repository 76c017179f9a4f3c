use anyhow::{anyhow, Context, Result};

// ---------------------------------------------------------------------------
// Digital-marketing metrics
// ---------------------------------------------------------------------------

/// Currencies offered by the calculator page.
pub const CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "INR", "AUD", "CAD", "JPY", "CNY", "CHF", "SEK", "NZD", "MXN", "SGD",
    "HKD", "NOK", "ZAR",
];

/// Raw advertising figures entered by the user.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AdInputs {
    pub ad_spend: f64,
    pub clicks: f64,
    pub conversions: f64,
    pub conversion_value: f64,
    pub impressions: f64,
}

/// Derived performance metrics. A zero denominator yields 0 rather than
/// an error, matching what the calculator displays for blank inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdMetrics {
    /// Cost per click.
    pub cpc: f64,
    /// Cost per acquisition.
    pub cpa: f64,
    /// Click-through rate, percent.
    pub ctr: f64,
    /// Return on investment, percent.
    pub roi: f64,
}

impl AdInputs {
    pub fn metrics(&self) -> AdMetrics {
        let cpc = if self.clicks != 0.0 {
            self.ad_spend / self.clicks
        } else {
            0.0
        };
        let cpa = if self.conversions != 0.0 {
            self.ad_spend / self.conversions
        } else {
            0.0
        };
        let ctr = if self.impressions != 0.0 {
            self.clicks / self.impressions * 100.0
        } else {
            0.0
        };
        let roi = if self.ad_spend != 0.0 {
            (self.conversions * self.conversion_value - self.ad_spend) / self.ad_spend * 100.0
        } else {
            0.0
        };
        AdMetrics { cpc, cpa, ctr, roi }
    }
}

// ---------------------------------------------------------------------------
// CSV export of the metric table
// ---------------------------------------------------------------------------

/// The nine-row Metric/Value table: the five inputs followed by the
/// four derived metrics, formatted with the selected currency.
pub fn metrics_csv(currency: &str, inputs: &AdInputs) -> Result<String> {
    let m = inputs.metrics();
    let rows: [(&str, String); 9] = [
        ("Ad Spend", format!("{currency} {:.2}", inputs.ad_spend)),
        ("Clicks", format!("{:.2}", inputs.clicks)),
        ("Conversions", format!("{:.2}", inputs.conversions)),
        (
            "Average Conversion Value",
            format!("{currency} {:.2}", inputs.conversion_value),
        ),
        ("Impressions", format!("{:.2}", inputs.impressions)),
        ("Cost Per Click (CPC)", format!("{currency} {:.2}", m.cpc)),
        ("Cost Per Acquisition (CPA)", format!("{currency} {:.2}", m.cpa)),
        ("Click-Through Rate (CTR)", format!("{:.2} %", m.ctr)),
        ("Return on Investment (ROI)", format!("{:.2} %", m.roi)),
    ];

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["Metric", "Value"])
        .context("writing metric header")?;
    for (metric, value) in rows {
        writer
            .write_record([metric, value.as_str()])
            .with_context(|| format!("writing metric row {metric}"))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow!("flushing metric CSV: {e}"))?;
    String::from_utf8(bytes).context("metric CSV was not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_the_four_metrics() {
        let inputs = AdInputs {
            ad_spend: 1000.0,
            clicks: 500.0,
            conversions: 50.0,
            conversion_value: 40.0,
            impressions: 20000.0,
        };
        let m = inputs.metrics();
        assert!((m.cpc - 2.0).abs() < 1e-12);
        assert!((m.cpa - 20.0).abs() < 1e-12);
        assert!((m.ctr - 2.5).abs() < 1e-12);
        // (50 * 40 - 1000) / 1000 * 100 = 100 %
        assert!((m.roi - 100.0).abs() < 1e-12);
    }

    #[test]
    fn zero_denominators_yield_zero() {
        let m = AdInputs::default().metrics();
        assert_eq!(m.cpc, 0.0);
        assert_eq!(m.cpa, 0.0);
        assert_eq!(m.ctr, 0.0);
        assert_eq!(m.roi, 0.0);
    }

    #[test]
    fn csv_carries_all_nine_rows() {
        let inputs = AdInputs {
            ad_spend: 100.0,
            clicks: 50.0,
            ..Default::default()
        };
        let out = metrics_csv("USD", &inputs).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "Metric,Value");
        assert_eq!(lines[1], "Ad Spend,USD 100.00");
        assert_eq!(lines[6], "Cost Per Click (CPC),USD 2.00");
    }
}
