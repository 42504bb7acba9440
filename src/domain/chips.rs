use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Количество фишек (игровых денег). Обёртка над u64, чтобы не путать с обычными числами.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chips(pub u64);

async_graphql::scalar!(Chips);

impl Chips {
    pub const ZERO: Chips = Chips(0);

    pub fn new(amount: u64) -> Self {
        Chips(amount)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Безопасное вычитание, не даёт уйти в минус.
    pub fn saturating_sub(self, other: Chips) -> Chips {
        Chips(self.0.saturating_sub(other.0))
    }

    /// Сложение с проверкой переполнения (для ставок, где переполнение = ошибка ввода).
    pub fn checked_add(self, other: Chips) -> Option<Chips> {
        self.0.checked_add(other.0).map(Chips)
    }

    /// Применить знаковую дельту, не опускаясь ниже нуля.
    pub fn apply_delta_floored(self, delta: i64) -> Chips {
        if delta >= 0 {
            Chips(self.0.saturating_add(delta as u64))
        } else {
            Chips(self.0.saturating_sub(delta.unsigned_abs()))
        }
    }

    /// Значение как i64 для расчёта дельт баланса (с насыщением).
    pub fn as_signed(self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl fmt::Display for Chips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Chips {
    type Output = Chips;

    fn add(self, rhs: Chips) -> Self::Output {
        Chips(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Chips {
    fn add_assign(&mut self, rhs: Chips) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Chips {
    type Output = Chips;

    fn sub(self, rhs: Chips) -> Self::Output {
        Chips(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Chips {
    fn sub_assign(&mut self, rhs: Chips) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

/// Множитель выплаты: полный возврат с учётом ставки (2.0 = выплата 1:1).
///
/// Хранится в базисных пунктах (10 000 = 1.0×), чтобы `floor(ставка × множитель)`
/// считался в целых числах без ошибок округления f64 (100 × 1.95 = 195, а не 194).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PayoutMultiplier(pub u32);

async_graphql::scalar!(PayoutMultiplier);

impl PayoutMultiplier {
    pub const BASIS: u32 = 10_000;
    /// Минимально допустимый множитель – возврат ставки.
    pub const ONE: PayoutMultiplier = PayoutMultiplier(Self::BASIS);

    pub const fn from_basis_points(bp: u32) -> Self {
        PayoutMultiplier(bp)
    }

    /// Из десятичного множителя (например, 1.95). Округляем до ближайшего пункта.
    /// Отрицательные и нечисловые значения дают None.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        let bp = (value * Self::BASIS as f64).round();
        if bp > u32::MAX as f64 {
            return None;
        }
        Some(PayoutMultiplier(bp as u32))
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / Self::BASIS as f64
    }

    /// Полная выплата по выигравшей ставке: floor(wager × multiplier).
    pub fn payout(self, wager: Chips) -> Chips {
        let gross = wager.0 as u128 * self.0 as u128 / Self::BASIS as u128;
        Chips(u64::try_from(gross).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for PayoutMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f64())
    }
}
