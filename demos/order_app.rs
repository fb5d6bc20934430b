//! Order application wired by the container.
//!
//! Run with `RUST_LOG=wirebox=debug cargo run --example order_app` to see
//! construction and teardown events.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing_subscriber::EnvFilter;
use wirebox::{ComponentDefinition, ContainerOptions, DiError, HookResult, Lifecycle, Provider, Registry, Resolver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grade {
    Basic,
    Vip,
}

#[derive(Debug, Clone)]
struct Member {
    id: u64,
    name: String,
    grade: Grade,
}

trait MemberRepository: Send + Sync {
    fn save(&self, member: Member);
    fn find_by_id(&self, id: u64) -> Option<Member>;
}

#[derive(Default)]
struct MemoryMemberRepository {
    store: RwLock<HashMap<u64, Member>>,
}

impl MemberRepository for MemoryMemberRepository {
    fn save(&self, member: Member) {
        self.store.write().insert(member.id, member);
    }

    fn find_by_id(&self, id: u64) -> Option<Member> {
        self.store.read().get(&id).cloned()
    }
}

impl Lifecycle for MemoryMemberRepository {
    fn destroy(&self) -> HookResult {
        let count = self.store.read().len();
        println!("closing member store ({} members)", count);
        Ok(())
    }
}

trait DiscountPolicy: Send + Sync {
    fn discount(&self, member: &Member, price: u64) -> u64;
}

struct FixDiscountPolicy;
impl DiscountPolicy for FixDiscountPolicy {
    fn discount(&self, member: &Member, _price: u64) -> u64 {
        if member.grade == Grade::Vip { 1000 } else { 0 }
    }
}

struct RateDiscountPolicy;
impl DiscountPolicy for RateDiscountPolicy {
    fn discount(&self, member: &Member, price: u64) -> u64 {
        if member.grade == Grade::Vip { price / 10 } else { 0 }
    }
}

/// Per-request receipt number, created fresh for every order.
struct Receipt {
    number: u64,
}

struct OrderService {
    members: Arc<dyn MemberRepository>,
    policy: Arc<dyn DiscountPolicy>,
    receipts: Provider<Receipt>,
}

impl OrderService {
    fn create_order(&self, member_id: u64, item: &str, price: u64) -> Result<String, DiError> {
        let Some(member) = self.members.find_by_id(member_id) else {
            return Ok(format!("no member {}", member_id));
        };
        let discount = self.policy.discount(&member, price);
        let receipt = self.receipts.get()?;
        Ok(format!(
            "#{} {} bought {} for {} (discount {})",
            receipt.number,
            member.name,
            item,
            price - discount,
            discount
        ))
    }
}

fn registry() -> Result<Registry, DiError> {
    let next_receipt = Arc::new(std::sync::atomic::AtomicU64::new(1));

    let mut registry = Registry::new();
    registry
        .register(
            ComponentDefinition::singleton::<MemoryMemberRepository, _>(|_| {
                Ok(Arc::new(MemoryMemberRepository::default()))
            })
            .named("memoryMemberRepository")
            .with_lifecycle(),
        )?
        .register(
            ComponentDefinition::singleton::<dyn MemberRepository, _>(|args| {
                Ok(args.next::<MemoryMemberRepository>()? as Arc<dyn MemberRepository>)
            })
            .named("memberRepository")
            .depends_on::<MemoryMemberRepository>(),
        )?
        .register(
            ComponentDefinition::singleton::<dyn DiscountPolicy, _>(|_| {
                Ok(Arc::new(FixDiscountPolicy) as Arc<dyn DiscountPolicy>)
            })
            .named("fixDiscountPolicy")
            .qualifier("fix"),
        )?
        .register(
            ComponentDefinition::singleton::<dyn DiscountPolicy, _>(|_| {
                Ok(Arc::new(RateDiscountPolicy) as Arc<dyn DiscountPolicy>)
            })
            .named("rateDiscountPolicy")
            .qualifier("mainDiscountPolicy")
            .primary(),
        )?
        .register(ComponentDefinition::prototype::<Receipt, _>(move |_| {
            Ok(Arc::new(Receipt {
                number: next_receipt.fetch_add(1, std::sync::atomic::Ordering::Relaxed),
            }))
        }))?
        .register(
            ComponentDefinition::singleton::<OrderService, _>(|args| {
                Ok(Arc::new(OrderService {
                    members: args.next()?,
                    policy: args.next()?,
                    receipts: args.provider()?,
                }))
            })
            .named("orderService")
            .depends_on::<dyn MemberRepository>()
            .depends_on::<dyn DiscountPolicy>()
            .provider_of::<Receipt>(),
        )?;
    Ok(registry)
}

fn main() -> Result<(), DiError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let container = registry()?.start(&ContainerOptions::default())?;

    let members = container.resolve::<dyn MemberRepository>()?;
    members.save(Member { id: 1, name: "memberA".to_string(), grade: Grade::Vip });
    members.save(Member { id: 2, name: "memberB".to_string(), grade: Grade::Basic });

    let orders = container.resolve::<OrderService>()?;
    println!("{}", orders.create_order(1, "itemA", 20_000)?);
    println!("{}", orders.create_order(2, "itemB", 20_000)?);
    println!("{}", orders.create_order(3, "itemC", 5_000)?);

    let fix = container.resolve_qualified::<dyn DiscountPolicy>("fix")?;
    if let Some(vip) = members.find_by_id(1) {
        println!("fixed policy would give {} off", fix.discount(&vip, 20_000));
    }

    container.teardown();
    Ok(())
}
