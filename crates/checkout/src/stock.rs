//! Stock movements shared by the order, payment, and status flows.

use common::ProductId;
use domain::{OrderError, OrderLine};
use store::ProductStore;

use crate::error::{CheckoutError, Result};

/// Deducts stock for every line, all-or-nothing. On the first line that
/// cannot be covered, everything already deducted is put back and the
/// shortfall is reported.
pub(crate) async fn deduct_lines_strict<S: ProductStore>(
    store: &S,
    lines: &[OrderLine],
) -> Result<()> {
    for (idx, line) in lines.iter().enumerate() {
        let color = line.selected_color.as_deref();
        let applied = store
            .try_decrement_stock(&line.product_id, color, line.quantity)
            .await?;
        if !applied {
            restore_lines(store, &lines[..idx]).await?;
            let available = match store.get_product(&line.product_id).await? {
                Some(product) => product.available_stock(color),
                None => 0,
            };
            return Err(CheckoutError::Order(OrderError::InsufficientStock {
                product: line.product_id.clone(),
                requested: line.quantity,
                available,
            }));
        }
    }
    Ok(())
}

/// Deducts stock for every line that can be covered, skipping the rest.
/// Returns the skipped product ids. Used after payment capture, where
/// the money is already taken and a shortfall is an ops followup rather
/// than a checkout failure.
pub(crate) async fn deduct_lines_lenient<S: ProductStore>(
    store: &S,
    lines: &[OrderLine],
) -> Result<Vec<ProductId>> {
    let mut skipped = Vec::new();
    for line in lines {
        let applied = store
            .try_decrement_stock(&line.product_id, line.selected_color.as_deref(), line.quantity)
            .await?;
        if !applied {
            tracing::warn!(
                product_id = %line.product_id,
                quantity = line.quantity,
                "stock deduction skipped after payment, not enough stock"
            );
            skipped.push(line.product_id.clone());
        }
    }
    Ok(skipped)
}

/// Returns stock for every line unconditionally.
pub(crate) async fn restore_lines<S: ProductStore>(store: &S, lines: &[OrderLine]) -> Result<()> {
    for line in lines {
        store
            .restore_stock(&line.product_id, line.selected_color.as_deref(), line.quantity)
            .await?;
    }
    Ok(())
}
