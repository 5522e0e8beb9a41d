mod common;

use alloy_primitives::U256;
use bcube_token_sale::errors::{PrivateAllocationSet, ReserveDecreased};
use bcube_token_sale::presets::private_allocation_cap;
use bcube_token_sale::tiers::Round;
use bcube_token_sale::{dollars, tokens, Context, Errors, SaleConfig};
use common::*;

#[test]
fn starting_hardcap_excludes_the_launchpad_reserve() -> eyre::Result<()> {
    let mut ledger = ledger()?;
    let sale = sale(&mut ledger, SaleConfig::public_sale, 0)?;
    assert_eq!(sale.current_hardcap()? / tokens(1), U256::from(6_083_333u64));
    assert_eq!(sale.hardcap_reserve(), tokens(2_250_000));
    Ok(())
}

#[test]
fn reserve_can_only_shrink_while_open() -> eyre::Result<()> {
    let mut ledger = ledger()?;
    let mut sale = sale(&mut ledger, SaleConfig::public_sale, 0)?;
    let before = sale.current_hardcap()?;

    let early = Context::new(ADMIN, OPENING - 1);
    let err = sale
        .decrease_hardcap_reserve(&mut ledger, &early, tokens(1_000_000))
        .unwrap_err();
    assert!(matches!(err, Errors::NotOpen(_)));

    let admin = Context::new(ADMIN, OPENING + 1);
    let err = sale
        .decrease_hardcap_reserve(&mut ledger, &admin, tokens(3_000_000))
        .unwrap_err();
    assert!(matches!(err, Errors::MustDecrease(_)));

    // A 2M reserve frees 250,000 tokens for the public round
    sale.decrease_hardcap_reserve(&mut ledger, &admin, tokens(2_000_000))?;
    assert_eq!(sale.current_hardcap()?, before + tokens(250_000));
    assert_eq!(ledger.logs_of::<ReserveDecreased>(SALE).count(), 1);

    let err = sale
        .decrease_hardcap_reserve(&mut ledger, &admin, tokens(2_000_000))
        .unwrap_err();
    assert!(matches!(err, Errors::MustDecrease(_)));

    let closed = Context::new(ADMIN, CLOSING);
    let err = sale
        .decrease_hardcap_reserve(&mut ledger, &closed, tokens(1))
        .unwrap_err();
    assert!(matches!(err, Errors::NotOpen(_)));
    Ok(())
}

#[test]
fn private_round_spills_into_public_round() -> eyre::Result<()> {
    let mut ledger = ledger()?;
    let mut sale = sale(&mut ledger, SaleConfig::public_sale, 5)?;

    for n in 1..=4 {
        let purchase = buy_eth(&mut ledger, &mut sale, participant(n), 50_000, OPENING)?;
        assert_eq!(purchase.fills[0].round, Round::PrivateRound);
    }
    assert_eq!(sale.tier_sold(0), dollars(200_000));

    let purchase = buy_eth(&mut ledger, &mut sale, participant(5), 1_000, OPENING)?;
    assert_eq!(purchase.fills.len(), 1);
    assert_eq!(purchase.fills[0].round, Round::PublicRound);
    assert_eq!(purchase.tokens, tokens(5_000));

    let allocation = sale.allocation(participant(5));
    assert_eq!(allocation.allocated_public_round, tokens(5_000));
    assert_eq!(allocation.allocated_private_round, U256::ZERO);
    Ok(())
}

#[test]
fn public_round_hard_cap() -> eyre::Result<()> {
    let mut ledger = ledger()?;
    let mut sale = sale(&mut ledger, SaleConfig::public_sale, 24)?;

    // $200,000 private round plus $950,000 public round
    for n in 1..=23 {
        buy_eth(&mut ledger, &mut sale, participant(n), 50_000, OPENING)?;
    }
    assert_eq!(sale.net_sold_dollar_units(), dollars(1_150_000));

    let err = buy_eth(&mut ledger, &mut sale, participant(24), 500, OPENING).unwrap_err();
    assert!(matches!(err, Errors::HardCapExceeded(_)));

    // Shrinking the reserve reopens the public round
    sale.decrease_hardcap_reserve(&mut ledger, &Context::new(ADMIN, OPENING), tokens(2_000_000))?;
    let purchase = buy_eth(&mut ledger, &mut sale, participant(24), 50_000, OPENING)?;
    assert_eq!(purchase.tokens, tokens(250_000));
    let err = buy_eth(&mut ledger, &mut sale, participant(24), 500, OPENING).unwrap_err();
    assert!(matches!(err, Errors::GlobalCapExceeded(_)));
    Ok(())
}

#[test]
fn private_allocations_respect_the_cap() -> eyre::Result<()> {
    let mut ledger = ledger()?;
    let mut sale = sale(&mut ledger, SaleConfig::public_sale, 0)?;
    let admin = Context::new(ADMIN, OPENING);

    let err = sale
        .set_private_allocation(&mut ledger, &admin, participant(1), tokens(6_666_667))
        .unwrap_err();
    assert!(matches!(err, Errors::AllocationCapExceeded(_)));

    for n in 1..=3 {
        sale.set_private_allocation(&mut ledger, &admin, participant(n), tokens(2_222_222))?;
    }
    assert_eq!(sale.net_private_allocated(), tokens(6_666_666));
    assert!(sale.net_private_allocated() <= private_allocation_cap());

    let err = sale
        .set_private_allocation(&mut ledger, &admin, participant(4), tokens(1))
        .unwrap_err();
    assert!(matches!(err, Errors::AllocationCapExceeded(_)));

    // A grant is replaced, not added to
    sale.set_private_allocation(&mut ledger, &admin, participant(1), tokens(1_000_000))?;
    assert_eq!(
        sale.allocation(participant(1)).allocated_private_allocation,
        tokens(1_000_000)
    );
    assert_eq!(sale.net_private_allocated(), tokens(5_444_444));
    sale.set_private_allocation(&mut ledger, &admin, participant(4), tokens(1))?;
    assert_eq!(sale.participants().len(), 4);
    assert_eq!(ledger.logs_of::<PrivateAllocationSet>(SALE).count(), 5);

    let err = sale
        .set_private_allocation(&mut ledger, &Context::new(participant(1), OPENING), participant(1), tokens(1))
        .unwrap_err();
    assert!(matches!(err, Errors::NotAdmin(_)));

    let closed = Context::new(ADMIN, CLOSING);
    let err = sale
        .set_private_allocation(&mut ledger, &closed, participant(1), tokens(1))
        .unwrap_err();
    assert!(matches!(err, Errors::SaleClosed(_)));
    Ok(())
}

#[test]
fn admin_role_can_be_handed_over() -> eyre::Result<()> {
    let mut ledger = ledger()?;
    let mut sale = sale(&mut ledger, SaleConfig::public_sale, 0)?;
    let new_admin = participant(0xaa);

    sale.set_admin(&Context::new(ADMIN, OPENING), new_admin)?;
    let err = sale
        .extend_closing_time(&mut ledger, &Context::new(ADMIN, OPENING), CLOSING + 1)
        .unwrap_err();
    assert!(matches!(err, Errors::NotAdmin(_)));
    sale.extend_closing_time(&mut ledger, &Context::new(new_admin, OPENING), CLOSING + 1)?;
    assert_eq!(sale.closing_time(), CLOSING + 1);
    Ok(())
}
