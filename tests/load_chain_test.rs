use std::{cell::RefCell, rc::Rc};

use futures::{
    FutureExt,
    executor::block_on,
    future::{pending, ready, try_join},
};

use stereoscope::resources::chain_loads;

#[test]
fn chain_resolves_loads_in_order() {
    let order: Rc<RefCell<Vec<&str>>> = Rc::new(RefCell::new(Vec::new()));

    let chain = chain_loads(["soccer.glb", "stand.glb", "pitch.glb"].map(|name| {
        let order = order.clone();
        async move {
            order.borrow_mut().push(name);
            Ok::<_, ()>(name)
        }
    }));

    let loaded = block_on(chain).unwrap();
    assert_eq!(loaded, vec!["soccer.glb", "stand.glb", "pitch.glb"]);
    assert_eq!(*order.borrow(), vec!["soccer.glb", "stand.glb", "pitch.glb"]);
}

#[test]
fn later_loads_do_not_start_before_earlier_ones_resolve() {
    let second_started = Rc::new(RefCell::new(false));

    let first = async { pending::<Result<u32, ()>>().await };
    let second = {
        let second_started = second_started.clone();
        async move {
            *second_started.borrow_mut() = true;
            Ok::<u32, ()>(2)
        }
    };

    let chain = chain_loads(vec![first.boxed_local(), second.boxed_local()]);
    // Polling the chain makes no progress past the stalled first load
    assert!(chain.now_or_never().is_none());
    assert!(!*second_started.borrow());
}

#[test]
fn a_stalled_load_stalls_the_whole_assembly() {
    // The shape of stage assembly: a sequenced model chain joined with an
    // independent texture load. A model that never finishes means the
    // assembled result never materializes; nothing panics and no partial
    // result escapes.
    let models = chain_loads(vec![
        ready(Ok::<&str, ()>("soccer.glb")).boxed_local(),
        pending::<Result<&str, ()>>().boxed_local(),
    ]);
    let texture = ready(Ok::<&str, ()>("pano.jpg"));

    assert!(try_join(models, texture).now_or_never().is_none());
}

#[test]
fn a_failed_load_aborts_the_chain() {
    let third_started = Rc::new(RefCell::new(false));

    let chain = chain_loads(vec![
        ready(Ok::<u32, &str>(1)).boxed_local(),
        ready(Err::<u32, &str>("404 on stand.glb")).boxed_local(),
        {
            let third_started = third_started.clone();
            async move {
                *third_started.borrow_mut() = true;
                Ok(3)
            }
        }
        .boxed_local(),
    ]);

    let result = block_on(chain);
    assert_eq!(result, Err("404 on stand.glb"));
    assert!(!*third_started.borrow());
}

#[test]
fn independent_loads_join_once_all_resolve() {
    let models = chain_loads(vec![
        ready(Ok::<&str, ()>("soccer.glb")).boxed_local(),
        ready(Ok::<&str, ()>("stand.glb")).boxed_local(),
    ]);
    let texture = ready(Ok::<&str, ()>("box.png"));

    let (models, texture) = try_join(models, texture)
        .now_or_never()
        .expect("all loads were ready")
        .unwrap();
    assert_eq!(models.len(), 2);
    assert_eq!(texture, "box.png");
}

#[test]
fn empty_chain_yields_an_empty_stage() {
    let loaded = block_on(chain_loads(Vec::<
        futures::future::Ready<Result<u32, ()>>,
    >::new()))
    .unwrap();
    assert!(loaded.is_empty());
}
