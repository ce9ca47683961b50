pub mod change {
    //! 就地改变已持有授权的种类，以及按配置长度续期。

    use std::time::Duration;

    use super::{HOUR, regulator_with_clock, regulator_with_config};
    use vigil_regulator::{
        CollectionActivity, CollectionRef, ContentSetActivity, ContentSetRef, LeaseSettings,
        RegulatorConfig,
    };

    const LEASE: Duration = Duration::from_secs(10);

    #[test]
    fn poll_hands_its_collection_to_a_new_content_crawl() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        assert!(regulator.start_collection_activity(CollectionActivity::TopLevelPoll, &c1, LEASE));

        assert!(regulator.change_collection_activity(
            CollectionActivity::TopLevelPoll,
            CollectionActivity::NewContentCrawl,
            &c1,
            HOUR
        ));
        assert_eq!(
            regulator.collection_activity(&c1),
            CollectionActivity::NewContentCrawl
        );

        regulator.finish_collection_activity(CollectionActivity::TopLevelPoll, &c1);
        clock.advance(LEASE);
        assert_eq!(
            regulator.collection_activity(&c1),
            CollectionActivity::NewContentCrawl
        );
        assert!(!regulator.start_collection_activity(CollectionActivity::Treewalk, &c1, HOUR));
    }

    #[test]
    fn change_needs_the_kind_still_held() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        assert!(!regulator.change_collection_activity(
            CollectionActivity::TopLevelPoll,
            CollectionActivity::NewContentCrawl,
            &c1,
            HOUR
        ));

        assert!(regulator.start_collection_activity(CollectionActivity::Treewalk, &c1, LEASE));
        assert!(!regulator.change_collection_activity(
            CollectionActivity::TopLevelPoll,
            CollectionActivity::NewContentCrawl,
            &c1,
            HOUR
        ));

        clock.advance(LEASE);
        assert!(!regulator.change_collection_activity(
            CollectionActivity::Treewalk,
            CollectionActivity::NewContentCrawl,
            &c1,
            HOUR
        ));
        assert_eq!(regulator.collection_activity(&c1), CollectionActivity::NoActivity);
    }

    #[test]
    fn content_poll_turns_into_repair_on_the_same_node() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        let node = ContentSetRef::subtree("C1", "/journal/v1");
        assert!(regulator.start_content_set_activity(
            ContentSetActivity::StandardContentPoll,
            &node,
            LEASE
        ));

        assert!(!regulator.change_content_set_activity(
            ContentSetActivity::BackgroundCrawl,
            ContentSetActivity::RepairCrawl,
            &node,
            HOUR
        ));
        assert!(regulator.change_content_set_activity(
            ContentSetActivity::StandardContentPoll,
            ContentSetActivity::RepairCrawl,
            &node,
            HOUR
        ));

        clock.advance(Duration::from_secs(30));
        assert_eq!(
            regulator.content_set_activity(&node),
            ContentSetActivity::RepairCrawl
        );
        assert_eq!(
            regulator.collection_activity(&c1),
            CollectionActivity::ContentSetActivity
        );

        regulator.finish_content_set_activity(ContentSetActivity::RepairCrawl, &node);
        assert_eq!(regulator.collection_activity(&c1), CollectionActivity::NoActivity);
    }

    #[test]
    fn renew_uses_the_configured_extension() {
        let config = RegulatorConfig {
            leases: LeaseSettings::new(HOUR, Duration::from_secs(5)).unwrap(),
        };
        let (regulator, clock) = regulator_with_config(config);
        let c1 = CollectionRef::new("C1");
        let node = ContentSetRef::subtree("C2", "/a");
        assert!(regulator.start_collection_activity(CollectionActivity::Treewalk, &c1, LEASE));
        assert!(regulator.start_content_set_activity(ContentSetActivity::RepairCrawl, &node, LEASE));

        clock.advance(Duration::from_secs(8));
        assert!(regulator.renew_collection_activity(CollectionActivity::Treewalk, &c1));
        assert!(regulator.renew_content_set_activity(ContentSetActivity::RepairCrawl, &node));
        assert!(!regulator.renew_collection_activity(CollectionActivity::NewContentCrawl, &c1));

        clock.advance(Duration::from_secs(6));
        assert_eq!(regulator.collection_activity(&c1), CollectionActivity::Treewalk);
        assert_eq!(
            regulator.content_set_activity(&node),
            ContentSetActivity::RepairCrawl
        );

        clock.advance(Duration::from_secs(1));
        assert_eq!(regulator.collection_activity(&c1), CollectionActivity::NoActivity);
        assert_eq!(
            regulator.content_set_activity(&node),
            ContentSetActivity::NoActivity
        );
    }

    #[test]
    fn unbounded_leases_are_accepted() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        let node = ContentSetRef::subtree("C2", "/a");
        assert!(regulator.start_collection_activity(CollectionActivity::Treewalk, &c1, Duration::MAX));
        assert!(regulator.extend_collection_activity(
            CollectionActivity::Treewalk,
            &c1,
            Duration::MAX
        ));
        assert!(regulator.start_content_set_activity(
            ContentSetActivity::BackgroundCrawl,
            &node,
            Duration::MAX
        ));
        assert!(regulator.extend_content_set_activity(
            ContentSetActivity::BackgroundCrawl,
            &node,
            Duration::MAX
        ));

        clock.advance(HOUR * 24 * 365);
        assert_eq!(regulator.collection_activity(&c1), CollectionActivity::Treewalk);
        assert_eq!(
            regulator.content_set_activity(&node),
            ContentSetActivity::BackgroundCrawl
        );
    }
}
