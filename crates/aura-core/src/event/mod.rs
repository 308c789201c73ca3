// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Provides the publish/subscribe primitive used to deliver governor events.
//!
//! The [`EventHub`] is generic over the event type so that `aura-core` stays
//! decoupled from the exact payloads higher-level crates publish. Delivery is
//! channel based: publishing never runs subscriber code, which keeps the
//! publisher free to mutate its own state while events are in flight.

mod hub;

pub use self::hub::{EventHub, Subscription, SubscriptionId};
