//! Crossing detection logic
//!
//! Determines when the best bid and best ask can match, and at what price

use types::numeric::Price;

/// Check if a bid and ask can match at given prices
///
/// For a buy order to match with a sell order the buy price must be
/// greater than or equal to the sell price.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Execution price for a crossed pair
///
/// Midpoint of bid and ask, rounded half-up to the cent. Neither resting
/// nor incoming order sets the price.
pub fn strike_price(bid_price: Price, ask_price: Price) -> Price {
    Price::midpoint(bid_price, ask_price)
}
