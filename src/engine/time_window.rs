// ==========================================
// 车队管理系统 - 日粒度活动窗口
// ==========================================
// 依据: Fleet_Dev_Master_Spec.md - PART B 日期语义
// 约束: 全部比较为日粒度, 无时分秒歧义; 结束日期含当天(到当日结束)
// ==========================================

use chrono::NaiveDate;

/// 日粒度活动窗口 (两端闭区间)
///
/// start == end 表示单日窗口, 该日当天即为活动日
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ActivityWindow {
    /// 创建活动窗口
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// 判断窗口是否覆盖指定日期: start ≤ today ≤ end
    pub fn contains(&self, today: NaiveDate) -> bool {
        self.start <= today && today <= self.end
    }

    /// 判断窗口是否已结束: today > end (严格在结束日期次日起成立)
    pub fn is_elapsed(&self, today: NaiveDate) -> bool {
        today > self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_contains_inclusive_bounds() {
        let window = ActivityWindow::new(d(2024, 1, 10), d(2024, 1, 12));

        assert!(!window.contains(d(2024, 1, 9)));
        assert!(window.contains(d(2024, 1, 10))); // 起始日当天生效
        assert!(window.contains(d(2024, 1, 11)));
        assert!(window.contains(d(2024, 1, 12))); // 结束日含当天
        assert!(!window.contains(d(2024, 1, 13)));
    }

    #[test]
    fn test_single_day_window() {
        // start == end: 仅当日活动
        let window = ActivityWindow::new(d(2024, 1, 10), d(2024, 1, 10));

        assert!(window.contains(d(2024, 1, 10)));
        assert!(!window.contains(d(2024, 1, 9)));
        assert!(!window.contains(d(2024, 1, 11)));
        assert!(window.is_elapsed(d(2024, 1, 11)));
    }

    #[test]
    fn test_is_elapsed_strictly_after_end() {
        let window = ActivityWindow::new(d(2024, 1, 10), d(2024, 1, 12));

        assert!(!window.is_elapsed(d(2024, 1, 12))); // 结束日当天仍在窗口内
        assert!(window.is_elapsed(d(2024, 1, 13))); // 次日起算结束
    }
}
