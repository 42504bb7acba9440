use crate::domain::hand::{BaccaratHands, Hand};
use crate::domain::shoe::Shoe;
use crate::engine::errors::EngineError;
use crate::engine::RandomSource;

/// Пересобрать шу, если в ней осталось меньше `floor` карт.
/// Вызывается только между раундами. Возвращает true, если шу заменена.
pub fn reshuffle_if_needed<R: RandomSource>(
    shoe: &mut Shoe,
    floor: usize,
    rng: &mut R,
) -> Result<bool, EngineError> {
    if !shoe.needs_reshuffle(floor) {
        return Ok(false);
    }
    *shoe = Shoe::build(shoe.deck_count(), rng)?;
    Ok(true)
}

/// Начальная раздача: две карты Player, затем две карты Banker.
pub fn deal_initial(shoe: &mut Shoe) -> Result<BaccaratHands, EngineError> {
    let player = Hand::from_cards(vec![shoe.draw()?, shoe.draw()?]);
    let banker = Hand::from_cards(vec![shoe.draw()?, shoe.draw()?]);
    Ok(BaccaratHands::new(player, banker))
}
