// Built-in defaults — the lowest precedence tier for every setting.

pub const DEFAULT_W_INTENT: f64 = 0.55;
pub const DEFAULT_W_COMPETITION: f64 = 0.45;

/// Market-intent tokens and their weights.
pub const DEFAULT_TOKENS: &[(&str, f64)] = &[
    ("빅사이즈", 1.0),
    ("임산부", 0.9),
    ("하객", 0.7),
    ("홈웨어", 0.6),
    ("니트", 0.5),
    ("롱", 0.5),
    ("후드", 0.4),
    ("맨투맨", 0.4),
    ("폴라", 0.4),
    ("기모", 0.3),
];

/// Promotional or misleading wording rejected by Korean marketplaces.
pub const DEFAULT_WORDS: &[&str] = &[
    "즉시 할인",
    "선착순",
    "무료",
    "무료 배송",
    "1위",
    "인기",
    "신상품",
    "신제품",
    "베스트",
    "추천",
    "특가",
    "이벤트",
    "적립",
    "가격",
    "쿠폰",
    "배송비",
    "할인율",
    "세일",
    "한정",
    "좋은",
    "최고",
    "초강력",
    "완벽",
    "최상",
    "가성비",
    "품질",
    "긴급",
    "특별 할인",
    "정품",
    "오리지널",
    "병행수입",
    "가짜",
    "진품",
];

/// Decorative symbols, each a single character.
pub const DEFAULT_SYMBOLS: &[&str] = &[
    "!", "?", "★", "☆", "◆", "◇", "■", "□", "●", "○", "✔", "✅", "※", "【", "】", "「", "」", "『",
    "』", "◀", "▶", "▲", "▼", "☞", "☜",
];
