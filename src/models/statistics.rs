use serde::{Deserialize, Serialize};

/// Raw delivery counters as reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCounts {
    pub total_audience: u64,
    pub delivered_count: u64,
    pub read_count: u64,
    pub replied_count: u64,
}

/// Derived view of [`CampaignCounts`]; never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignStatistics {
    pub total_audience: u64,
    pub delivered_count: u64,
    pub read_count: u64,
    pub replied_count: u64,
    pub delivered_percentage: u64,
    pub read_percentage: u64,
    pub replied_percentage: u64,
}

impl CampaignStatistics {
    /// True when no counter exceeds the audience it was sent to.
    pub fn is_consistent(&self) -> bool {
        self.delivered_count <= self.total_audience
            && self.read_count <= self.total_audience
            && self.replied_count <= self.total_audience
    }
}

fn percentage(count: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (count as f64 / total as f64 * 100.0).round() as u64
}

/// Percentages are rounded to the nearest integer and are not clamped to 100.
pub fn calculate_campaign_statistics(counts: &CampaignCounts) -> CampaignStatistics {
    let stats = CampaignStatistics {
        total_audience: counts.total_audience,
        delivered_count: counts.delivered_count,
        read_count: counts.read_count,
        replied_count: counts.replied_count,
        delivered_percentage: percentage(counts.delivered_count, counts.total_audience),
        read_percentage: percentage(counts.read_count, counts.total_audience),
        replied_percentage: percentage(counts.replied_count, counts.total_audience),
    };

    if !stats.is_consistent() {
        tracing::warn!(
            total_audience = stats.total_audience,
            delivered = stats.delivered_count,
            read = stats.read_count,
            replied = stats.replied_count,
            "Campaign counters exceed total audience"
        );
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_audience_yields_zero_percentages() {
        let stats = calculate_campaign_statistics(&CampaignCounts {
            total_audience: 0,
            delivered_count: 5,
            read_count: 0,
            replied_count: 0,
        });
        assert_eq!(stats.delivered_percentage, 0);
        assert_eq!(stats.read_percentage, 0);
        assert_eq!(stats.replied_percentage, 0);
    }

    #[test]
    fn percentages_of_total_audience() {
        let stats = calculate_campaign_statistics(&CampaignCounts {
            total_audience: 200,
            delivered_count: 100,
            read_count: 50,
            replied_count: 10,
        });
        assert_eq!(stats.delivered_percentage, 50);
        assert_eq!(stats.read_percentage, 25);
        assert_eq!(stats.replied_percentage, 5);
        assert!(stats.is_consistent());
    }

    #[test]
    fn rounds_to_nearest_integer() {
        let stats = calculate_campaign_statistics(&CampaignCounts {
            total_audience: 3,
            delivered_count: 2,
            read_count: 1,
            replied_count: 0,
        });
        assert_eq!(stats.delivered_percentage, 67);
        assert_eq!(stats.read_percentage, 33);
    }

    #[test]
    fn overflowing_counts_are_not_clamped() {
        let stats = calculate_campaign_statistics(&CampaignCounts {
            total_audience: 10,
            delivered_count: 15,
            read_count: 10,
            replied_count: 0,
        });
        assert_eq!(stats.delivered_percentage, 150);
        assert_eq!(stats.read_percentage, 100);
        assert!(!stats.is_consistent());
    }
}
