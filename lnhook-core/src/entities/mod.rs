pub mod subscription;

pub use subscription::{
    LookupSubscriptions, RegisterSubscription, Subscription, SubscriptionRegistry,
};
