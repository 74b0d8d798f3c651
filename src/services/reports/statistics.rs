use crate::models::reports::{GradeStatistics, GradedScore};

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// 汇总已批改成绩；空输入返回全零
pub fn compute_grade_statistics(scores: &[GradedScore]) -> GradeStatistics {
    if scores.is_empty() {
        return GradeStatistics::default();
    }

    let count = scores.len() as f64;
    let total: i64 = scores.iter().map(|s| i64::from(s.score)).sum();
    let percentage_sum: f64 = scores
        .iter()
        .map(|s| {
            if s.max_score > 0 {
                f64::from(s.score) / f64::from(s.max_score) * 100.0
            } else {
                0.0
            }
        })
        .sum();

    GradeStatistics {
        count: scores.len() as i64,
        average_score: round2(total as f64 / count),
        highest_score: scores.iter().map(|s| s.score).max().unwrap_or_default(),
        lowest_score: scores.iter().map(|s| s.score).min().unwrap_or_default(),
        average_percentage: round2(percentage_sum / count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(score: i32, max_score: i32) -> GradedScore {
        GradedScore { score, max_score }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        let stats = compute_grade_statistics(&[]);
        assert_eq!(stats, GradeStatistics::default());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.average_score, 0.0);
    }

    #[test]
    fn test_two_scores_out_of_hundred() {
        let stats = compute_grade_statistics(&[scored(90, 100), scored(70, 100)]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.average_score, 80.0);
        assert_eq!(stats.highest_score, 90);
        assert_eq!(stats.lowest_score, 70);
        assert_eq!(stats.average_percentage, 80.0);
    }

    #[test]
    fn test_percentage_uses_each_max_score() {
        let stats = compute_grade_statistics(&[scored(10, 20), scored(30, 40), scored(2, 3)]);
        // (50 + 75 + 66.666..) / 3
        assert_eq!(stats.average_percentage, 63.89);
        assert_eq!(stats.average_score, 14.0);
    }
}
