//! End-to-end flows across placement, payment, shipping, and status.

use checkout::{
    Actor, CartService, CheckoutConfig, CheckoutError, InMemoryCarrier, InMemoryGateway,
    InMemoryNotifier, Notification, OrderService, OrderSource, PaymentService, PlaceOrder,
    ShipmentAttempt, ShippingService, StatusService, VerifyPayment, signature,
};
use checkout::orders::NewOrderItem;
use common::{Money, OrderId, ProductId, UserId};
use domain::{
    ColorVariant, ContactInfo, Customer, OrderError, OrderStatus, PaymentMethod, PaymentStatus,
    Product, ShippingAddress,
};
use store::{
    Account, AccountStore, CartStore, InMemoryStore, OrderStore, ProductStore, ShipmentStore,
};

const SECRET: &str = "test-secret";

struct Harness {
    store: InMemoryStore,
    gateway: InMemoryGateway,
    carrier: InMemoryCarrier,
    notifier: InMemoryNotifier,
    orders: OrderService<InMemoryStore, InMemoryNotifier>,
    payments: PaymentService<InMemoryStore, InMemoryGateway, InMemoryCarrier, InMemoryNotifier>,
    shipping: ShippingService<InMemoryStore, InMemoryCarrier, InMemoryNotifier>,
    status: StatusService<InMemoryStore, InMemoryCarrier, InMemoryNotifier>,
    carts: CartService<InMemoryStore>,
}

async fn harness() -> Harness {
    let store = InMemoryStore::new();
    let gateway = InMemoryGateway::new();
    let carrier = InMemoryCarrier::new();
    let notifier = InMemoryNotifier::new();
    let config = CheckoutConfig::with_secret(SECRET);

    store
        .seed_product(Product::new(
            ProductId::new("SKU-1"),
            "Widget",
            Money::from_major(100),
            10,
        ))
        .await;
    store
        .seed_product(
            Product::new(ProductId::new("SKU-2"), "Shirt", Money::from_major(25), 0).with_colors(
                vec![ColorVariant::new("red", 5), ColorVariant::new("blue", 3)],
            ),
        )
        .await;

    Harness {
        orders: OrderService::new(store.clone(), notifier.clone(), config.clone()),
        payments: PaymentService::new(
            store.clone(),
            gateway.clone(),
            carrier.clone(),
            notifier.clone(),
            config.clone(),
        ),
        shipping: ShippingService::new(
            store.clone(),
            carrier.clone(),
            notifier.clone(),
            config.clone(),
        ),
        status: StatusService::new(store.clone(), carrier.clone(), notifier.clone(), config),
        carts: CartService::new(store.clone()),
        store,
        gateway,
        carrier,
        notifier,
    }
}

fn address() -> ShippingAddress {
    ShippingAddress {
        name: Some("Asha".into()),
        email: Some("asha@example.com".into()),
        address: "42 Marine Drive".into(),
        city: "Mumbai".into(),
        state: "MH".into(),
        country: "India".into(),
        postal_code: Some("400001".into()),
        pincode: None,
        phone: "9876543210".into(),
    }
}

fn registered(user_id: UserId) -> Customer {
    Customer::Registered {
        user_id,
        contact: ContactInfo::new("Asha", "asha@example.com").with_phone("9876543210"),
    }
}

fn place_cmd(customer: Customer, method: PaymentMethod, quantity: u32) -> PlaceOrder {
    PlaceOrder {
        customer,
        shipping_address: address(),
        payment_method: method,
        source: OrderSource::Items(vec![NewOrderItem {
            product_id: ProductId::new("SKU-1"),
            quantity,
            selected_color: None,
        }]),
    }
}

async fn stock_of(store: &InMemoryStore, sku: &str, color: Option<&str>) -> u32 {
    store
        .get_product(&ProductId::new(sku))
        .await
        .unwrap()
        .unwrap()
        .available_stock(color)
}

async fn verify_cmd(
    h: &Harness,
    order_id: &OrderId,
) -> VerifyPayment {
    let gw = h.payments.create_gateway_order(order_id).await.unwrap();
    let payment_id = format!("pay_{}", order_id.as_str());
    VerifyPayment {
        order_id: order_id.clone(),
        gateway_order_id: gw.gateway_order_id.clone(),
        gateway_payment_id: payment_id.clone(),
        signature: signature::sign(SECRET, &gw.gateway_order_id, &payment_id),
    }
}

#[tokio::test]
async fn cod_order_prices_and_deducts_immediately() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 2))
        .await
        .unwrap();

    assert_eq!(order.pricing.total_amount, Money::from_cents(20000));
    assert_eq!(order.pricing.shipping_fee, Money::from_cents(5000));
    assert_eq!(order.pricing.tax_amount, Money::from_cents(3600));
    assert_eq!(order.pricing.final_amount, Money::from_cents(28600));
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.serial, 1);

    // COD stock comes out at placement.
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 8);

    let sent = h.notifier.sent();
    assert!(matches!(sent[0], Notification::OrderConfirmation { .. }));
}

#[tokio::test]
async fn free_shipping_above_threshold() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 6))
        .await
        .unwrap();
    assert_eq!(order.pricing.total_amount, Money::from_cents(60000));
    assert!(order.pricing.shipping_fee.is_zero());
}

#[tokio::test]
async fn cod_insufficient_stock_fails_placement() {
    let h = harness().await;
    let result = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 11))
        .await;
    assert!(matches!(
        result,
        Err(CheckoutError::Order(OrderError::InsufficientStock {
            requested: 11,
            available: 10,
            ..
        }))
    ));
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 10);
}

#[tokio::test]
async fn prepaid_deducts_only_after_verification() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(
            registered(UserId::new()),
            PaymentMethod::Razorpay,
            2,
        ))
        .await
        .unwrap();

    // Nothing deducted until the money is verified.
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 10);
    assert!(order.requires_payment());

    let cmd = verify_cmd(&h, &order.order_id).await;
    let outcome = h.payments.verify_payment(cmd).await.unwrap();

    assert!(!outcome.already_verified);
    assert!(outcome.skipped_products.is_empty());
    assert_eq!(outcome.order.payment_status, PaymentStatus::Completed);
    assert_eq!(outcome.order.order_status, OrderStatus::Confirmed);
    assert!(outcome.order.paid_at.is_some());
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 8);

    // Complete address, so the booking goes straight through.
    assert!(matches!(outcome.shipment, ShipmentAttempt::Created(_)));
    assert!(outcome.order.has_shipment());
    assert_eq!(h.carrier.active_booking_count(), 1);
}

#[tokio::test]
async fn replayed_verification_does_not_double_deduct() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(
            registered(UserId::new()),
            PaymentMethod::Razorpay,
            2,
        ))
        .await
        .unwrap();

    let cmd = verify_cmd(&h, &order.order_id).await;
    h.payments.verify_payment(cmd.clone()).await.unwrap();
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 8);

    let replay = h.payments.verify_payment(cmd).await.unwrap();
    assert!(replay.already_verified);
    assert!(matches!(replay.shipment, ShipmentAttempt::Skipped(_)));
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 8);
    assert_eq!(h.carrier.active_booking_count(), 1);
}

#[tokio::test]
async fn invalid_signature_leaves_order_untouched() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(
            registered(UserId::new()),
            PaymentMethod::Razorpay,
            2,
        ))
        .await
        .unwrap();

    let mut cmd = verify_cmd(&h, &order.order_id).await;
    cmd.signature = signature::sign("wrong-secret", &cmd.gateway_order_id, &cmd.gateway_payment_id);

    let result = h.payments.verify_payment(cmd).await;
    assert!(matches!(result, Err(CheckoutError::InvalidSignature(_))));

    let stored = h.store.get_order(&order.order_id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Pending);
    assert!(stored.payment_id.is_none());
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 10);
    assert_eq!(h.carrier.active_booking_count(), 0);
}

#[tokio::test]
async fn gateway_order_rejected_when_already_paid() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(
            registered(UserId::new()),
            PaymentMethod::Razorpay,
            1,
        ))
        .await
        .unwrap();

    let cmd = verify_cmd(&h, &order.order_id).await;
    h.payments.verify_payment(cmd).await.unwrap();

    let result = h.payments.create_gateway_order(&order.order_id).await;
    assert!(matches!(result, Err(CheckoutError::AlreadyPaid(_))));
}

#[tokio::test]
async fn guest_is_promoted_after_verification() {
    let h = harness().await;
    let guest_id = UserId::new();
    let order = h
        .orders
        .place_order(PlaceOrder {
            customer: Customer::Guest {
                guest_id,
                contact: ContactInfo::new("Ravi", "ravi.kumar@example.com"),
            },
            shipping_address: address(),
            payment_method: PaymentMethod::Razorpay,
            source: OrderSource::Items(vec![NewOrderItem {
                product_id: ProductId::new("SKU-1"),
                quantity: 1,
                selected_color: None,
            }]),
        })
        .await
        .unwrap();

    let cmd = verify_cmd(&h, &order.order_id).await;
    let outcome = h.payments.verify_payment(cmd).await.unwrap();

    // Same id, now a registered customer backed by a real account.
    assert!(!outcome.order.customer.is_guest());
    assert_eq!(outcome.order.customer.user_id(), guest_id);

    let account = h
        .store
        .find_account_by_email("ravi.kumar@example.com")
        .await
        .unwrap()
        .expect("account created");
    assert_eq!(account.user_id, guest_id);
    assert!(account.password_digest.contains('$'));

    let credentials = h.notifier.sent().into_iter().find_map(|n| match n {
        Notification::GuestCredentials { temp_password, .. } => Some(temp_password),
        _ => None,
    });
    let temp_password = credentials.expect("credentials mailed");
    assert_eq!(temp_password.len(), 6);
    assert!(temp_password.starts_with("ravik"));
}

#[tokio::test]
async fn guest_promotion_overwrites_existing_account_credential() {
    let h = harness().await;
    let existing = UserId::new();
    h.store
        .insert_account(Account {
            user_id: existing,
            name: "Ravi".into(),
            email: "ravi.kumar@example.com".into(),
            password_digest: "old-digest".into(),
            created_at: chrono::Utc::now(),
        })
        .await
        .unwrap();

    let order = h
        .orders
        .place_order(PlaceOrder {
            customer: Customer::Guest {
                guest_id: UserId::new(),
                contact: ContactInfo::new("Ravi", "ravi.kumar@example.com"),
            },
            shipping_address: address(),
            payment_method: PaymentMethod::Razorpay,
            source: OrderSource::Items(vec![NewOrderItem {
                product_id: ProductId::new("SKU-1"),
                quantity: 1,
                selected_color: None,
            }]),
        })
        .await
        .unwrap();

    let cmd = verify_cmd(&h, &order.order_id).await;
    let outcome = h.payments.verify_payment(cmd).await.unwrap();

    // The order is linked to the pre-existing account.
    assert!(!outcome.order.customer.is_guest());
    assert_eq!(outcome.order.customer.user_id(), existing);

    // The stored credential is replaced so the mailed password works.
    let account = h
        .store
        .find_account_by_email("ravi.kumar@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(account.password_digest, "old-digest");
    assert!(account.password_digest.contains('$'));

    let credentials = h.notifier.sent().into_iter().find_map(|n| match n {
        Notification::GuestCredentials { temp_password, .. } => Some(temp_password),
        _ => None,
    });
    let temp_password = credentials.expect("credentials mailed");
    assert_eq!(temp_password.len(), 6);
}

#[tokio::test]
async fn payment_failure_cancels_without_touching_stock() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(
            registered(UserId::new()),
            PaymentMethod::Razorpay,
            2,
        ))
        .await
        .unwrap();

    let failed = h.payments.payment_failed(&order.order_id).await.unwrap();
    assert_eq!(failed.payment_status, PaymentStatus::Failed);
    assert_eq!(failed.order_status, OrderStatus::Cancelled);
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 10);
}

#[tokio::test]
async fn full_refund_flips_both_statuses() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(
            registered(UserId::new()),
            PaymentMethod::Razorpay,
            2,
        ))
        .await
        .unwrap();
    let cmd = verify_cmd(&h, &order.order_id).await;
    h.payments.verify_payment(cmd).await.unwrap();

    let refunded = h.payments.refund(&order.order_id, None).await.unwrap();
    assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
    assert_eq!(refunded.order_status, OrderStatus::Refunded);
    assert_eq!(refunded.refunded_amount(), Money::from_cents(28600));
    assert_eq!(h.gateway.refunds().len(), 1);
}

#[tokio::test]
async fn partial_refund() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(
            registered(UserId::new()),
            PaymentMethod::Razorpay,
            2,
        ))
        .await
        .unwrap();
    let cmd = verify_cmd(&h, &order.order_id).await;
    h.payments.verify_payment(cmd).await.unwrap();

    let refunded = h
        .payments
        .refund(&order.order_id, Some(Money::from_cents(5000)))
        .await
        .unwrap();
    assert_eq!(refunded.payment_status, PaymentStatus::PartiallyRefunded);
    assert_eq!(refunded.order_status, OrderStatus::PartiallyRefunded);
}

#[tokio::test]
async fn refund_without_payment_rejected() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 1))
        .await
        .unwrap();
    let result = h.payments.refund(&order.order_id, None).await;
    assert!(matches!(result, Err(CheckoutError::NoPaymentOnFile(_))));
}

#[tokio::test]
async fn user_cancellation_restores_stock_and_cancels_shipment() {
    let h = harness().await;
    let user_id = UserId::new();
    let order = h
        .orders
        .place_order(place_cmd(registered(user_id), PaymentMethod::Cod, 2))
        .await
        .unwrap();
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 8);

    h.status
        .update_status(&order.order_id, OrderStatus::Confirmed)
        .await
        .unwrap();
    let shipment = h.shipping.create_shipment(&order.order_id).await.unwrap();

    let cancelled = h
        .status
        .cancel_order(&order.order_id, Actor::User(user_id), Some("changed my mind".into()))
        .await
        .unwrap();
    assert_eq!(cancelled.order_status, OrderStatus::Cancelled);
    assert_eq!(cancelled.cancelled_by.as_deref(), Some("user"));
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 10);

    let stored = h
        .store
        .get_shipment(&shipment.shipment_id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.is_cancelled());
    assert!(h.carrier.is_cancelled(stored.carrier_order_id.as_deref().unwrap()));
}

#[tokio::test]
async fn cancellation_notifies_admin_with_actor_and_reason() {
    let h = harness().await;
    let user_id = UserId::new();
    let order = h
        .orders
        .place_order(place_cmd(registered(user_id), PaymentMethod::Cod, 1))
        .await
        .unwrap();

    h.status
        .cancel_order(
            &order.order_id,
            Actor::User(user_id),
            Some("wrong size".into()),
        )
        .await
        .unwrap();

    let notice = h.notifier.sent().into_iter().find_map(|n| match n {
        Notification::AdminCancellation {
            cancelled_by,
            reason,
            ..
        } => Some((cancelled_by, reason)),
        _ => None,
    });
    let (cancelled_by, reason) = notice.expect("admin notified");
    assert_eq!(cancelled_by, "user");
    assert_eq!(reason.as_deref(), Some("wrong size"));
}

#[tokio::test]
async fn cancellation_rejected_after_shipping() {
    let h = harness().await;
    let user_id = UserId::new();
    let order = h
        .orders
        .place_order(place_cmd(registered(user_id), PaymentMethod::Cod, 1))
        .await
        .unwrap();

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
    ] {
        h.status.update_status(&order.order_id, status).await.unwrap();
    }

    let result = h
        .status
        .cancel_order(&order.order_id, Actor::User(user_id), None)
        .await;
    assert!(matches!(
        result,
        Err(CheckoutError::Order(OrderError::NotCancellable {
            status: OrderStatus::Shipped
        }))
    ));
}

#[tokio::test]
async fn users_cannot_cancel_others_orders() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 1))
        .await
        .unwrap();

    let result = h
        .status
        .cancel_order(&order.order_id, Actor::User(UserId::new()), None)
        .await;
    assert!(matches!(result, Err(CheckoutError::NotAuthorized(_))));
}

#[tokio::test]
async fn delivery_completes_cod_payment() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 1))
        .await
        .unwrap();

    for status in [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        h.status.update_status(&order.order_id, status).await.unwrap();
    }

    let stored = h.store.get_order(&order.order_id).await.unwrap().unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Completed);
    assert!(stored.delivered_at.is_some());
    assert!(stored.paid_at.is_some());
}

#[tokio::test]
async fn reactivation_re_deducts_stock() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 2))
        .await
        .unwrap();
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 8);

    h.status
        .update_status(&order.order_id, OrderStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 10);

    h.status
        .update_status(&order.order_id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 8);
}

#[tokio::test]
async fn status_update_rejects_no_op_and_skips() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 1))
        .await
        .unwrap();

    let no_op = h
        .status
        .update_status(&order.order_id, OrderStatus::Pending)
        .await;
    assert!(matches!(
        no_op,
        Err(CheckoutError::Order(OrderError::NoOpTransition { .. }))
    ));

    let skip = h
        .status
        .update_status(&order.order_id, OrderStatus::Delivered)
        .await;
    assert!(matches!(
        skip,
        Err(CheckoutError::Order(OrderError::InvalidTransition { .. }))
    ));
}

#[tokio::test]
async fn duplicate_shipment_rejected() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 1))
        .await
        .unwrap();

    h.shipping.create_shipment(&order.order_id).await.unwrap();
    let result = h.shipping.create_shipment(&order.order_id).await;
    assert!(matches!(result, Err(CheckoutError::ShipmentExists(_))));
    assert_eq!(h.carrier.active_booking_count(), 1);
}

#[tokio::test]
async fn shipment_requires_complete_address() {
    let h = harness().await;
    let mut cmd = place_cmd(registered(UserId::new()), PaymentMethod::Cod, 1);
    cmd.shipping_address.postal_code = None;
    cmd.shipping_address.pincode = None;
    let order = h.orders.place_order(cmd).await.unwrap();

    let result = h.shipping.create_shipment(&order.order_id).await;
    match result {
        Err(CheckoutError::Order(OrderError::MissingShippingData { fields })) => {
            assert_eq!(fields, vec!["postal_code"]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn shipment_cancel_is_idempotent() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 1))
        .await
        .unwrap();
    h.shipping.create_shipment(&order.order_id).await.unwrap();

    h.shipping
        .cancel_shipment(&order.order_id, "admin", None)
        .await
        .unwrap();
    // Second cancel is a no-op, not an error.
    let again = h
        .shipping
        .cancel_shipment(&order.order_id, "admin", None)
        .await
        .unwrap();
    assert!(again.is_cancelled());
}

#[tokio::test]
async fn cart_checkout_clears_cart_and_uses_color_stock() {
    let h = harness().await;
    let user_id = UserId::new();

    h.carts
        .add_item(user_id, ProductId::new("SKU-2"), 2, Some("red".into()))
        .await
        .unwrap();
    let cart = h
        .carts
        .add_item(user_id, ProductId::new("SKU-2"), 1, Some("blue".into()))
        .await
        .unwrap();
    assert_eq!(cart.total_items, 3);
    assert_eq!(cart.total_price, Money::from_cents(7500));

    let order = h
        .orders
        .place_order(PlaceOrder {
            customer: registered(user_id),
            shipping_address: address(),
            payment_method: PaymentMethod::Cod,
            source: OrderSource::Cart,
        })
        .await
        .unwrap();

    assert_eq!(order.lines.len(), 2);
    assert_eq!(stock_of(&h.store, "SKU-2", Some("red")).await, 3);
    assert_eq!(stock_of(&h.store, "SKU-2", Some("blue")).await, 2);
    assert_eq!(stock_of(&h.store, "SKU-2", None).await, 5);

    // Cart is gone once the order is durable.
    assert!(h.store.get_cart(user_id).await.unwrap().is_none());

    // Placing again from the now-empty cart fails.
    let again = h
        .orders
        .place_order(PlaceOrder {
            customer: registered(user_id),
            shipping_address: address(),
            payment_method: PaymentMethod::Cod,
            source: OrderSource::Cart,
        })
        .await;
    assert!(matches!(again, Err(CheckoutError::EmptyCart(_))));
}

#[tokio::test]
async fn cart_add_rejects_beyond_color_stock() {
    let h = harness().await;
    let user_id = UserId::new();
    h.carts
        .add_item(user_id, ProductId::new("SKU-2"), 3, Some("blue".into()))
        .await
        .unwrap();

    let result = h
        .carts
        .add_item(user_id, ProductId::new("SKU-2"), 1, Some("blue".into()))
        .await;
    assert!(matches!(
        result,
        Err(CheckoutError::Order(OrderError::InsufficientStock {
            requested: 4,
            available: 3,
            ..
        }))
    ));
}

#[tokio::test]
async fn failed_booking_does_not_fail_verification() {
    let h = harness().await;
    h.carrier.set_fail_on_book(true);

    let order = h
        .orders
        .place_order(place_cmd(
            registered(UserId::new()),
            PaymentMethod::Razorpay,
            1,
        ))
        .await
        .unwrap();
    let cmd = verify_cmd(&h, &order.order_id).await;
    let outcome = h.payments.verify_payment(cmd).await.unwrap();

    assert_eq!(outcome.order.payment_status, PaymentStatus::Completed);
    assert!(matches!(outcome.shipment, ShipmentAttempt::Failed(_)));
    assert!(!outcome.order.has_shipment());
}

#[tokio::test]
async fn notification_outage_does_not_fail_placement() {
    let h = harness().await;
    h.notifier.set_fail_on_send(true);

    let order = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 1))
        .await
        .unwrap();
    assert_eq!(order.order_status, OrderStatus::Pending);
    assert_eq!(h.notifier.sent_count(), 0);
}

#[tokio::test]
async fn verification_skips_lines_that_ran_out_of_stock() {
    let h = harness().await;
    let order = h
        .orders
        .place_order(place_cmd(
            registered(UserId::new()),
            PaymentMethod::Razorpay,
            8,
        ))
        .await
        .unwrap();

    // Stock drains between placement and verification.
    let rival = h
        .orders
        .place_order(place_cmd(registered(UserId::new()), PaymentMethod::Cod, 5))
        .await
        .unwrap();
    assert_eq!(rival.order_status, OrderStatus::Pending);
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 5);

    let cmd = verify_cmd(&h, &order.order_id).await;
    let outcome = h.payments.verify_payment(cmd).await.unwrap();

    // Payment stands; the shortfall is reported, not charged back.
    assert_eq!(outcome.order.payment_status, PaymentStatus::Completed);
    assert_eq!(outcome.skipped_products, vec![ProductId::new("SKU-1")]);
    assert_eq!(stock_of(&h.store, "SKU-1", None).await, 5);
}
