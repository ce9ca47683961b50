pub mod extension {
    //! 租约续期：只能续期仍归属调用方的租约。

    use std::time::Duration;

    use super::{HOUR, regulator_with_clock};
    use vigil_regulator::{CollectionActivity, CollectionRef, ContentSetActivity, ContentSetRef};

    const LEASE: Duration = Duration::from_secs(10);

    #[test]
    fn extended_collection_lease_outlives_its_original_deadline() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        assert!(regulator.start_collection_activity(CollectionActivity::NewContentCrawl, &c1, LEASE));

        clock.advance(Duration::from_secs(9));
        assert!(regulator.extend_collection_activity(
            CollectionActivity::NewContentCrawl,
            &c1,
            LEASE
        ));
        clock.advance(Duration::from_secs(5));
        assert_eq!(
            regulator.collection_activity(&c1),
            CollectionActivity::NewContentCrawl
        );
        clock.advance(Duration::from_secs(6));
        assert_eq!(regulator.collection_activity(&c1), CollectionActivity::NoActivity);
    }

    #[test]
    fn foreign_or_expired_leases_are_not_extended() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        assert!(regulator.start_collection_activity(CollectionActivity::Treewalk, &c1, LEASE));
        assert!(!regulator.extend_collection_activity(CollectionActivity::NewContentCrawl, &c1, LEASE));

        clock.advance(LEASE);
        assert!(!regulator.extend_collection_activity(CollectionActivity::Treewalk, &c1, LEASE));
        assert_eq!(regulator.collection_activity(&c1), CollectionActivity::NoActivity);
    }

    #[test]
    fn content_set_extension_keeps_the_collection_marked() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        let node = ContentSetRef::subtree("C1", "/a");
        assert!(regulator.start_content_set_activity(ContentSetActivity::RepairCrawl, &node, LEASE));

        clock.advance(Duration::from_secs(9));
        assert!(regulator.extend_content_set_activity(
            ContentSetActivity::RepairCrawl,
            &node,
            LEASE
        ));
        clock.advance(Duration::from_secs(5));
        assert_eq!(
            regulator.content_set_activity(&node),
            ContentSetActivity::RepairCrawl
        );
        assert_eq!(
            regulator.collection_activity(&c1),
            CollectionActivity::ContentSetActivity
        );
        assert!(!regulator.start_collection_activity(CollectionActivity::Treewalk, &c1, HOUR));
    }

    /// 标记因后续短租约授权先行过期时，续期会按内容集剩余租约重新安装标记。
    #[test]
    fn extension_reinstalls_an_expired_marker() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        let long = ContentSetRef::subtree("C1", "/long");
        assert!(regulator.start_content_set_activity(ContentSetActivity::BackgroundCrawl, &long, HOUR));
        assert!(regulator.start_content_set_activity(
            ContentSetActivity::RepairCrawl,
            &ContentSetRef::subtree("C1", "/short"),
            LEASE
        ));
        clock.advance(LEASE);

        assert!(regulator.extend_content_set_activity(
            ContentSetActivity::BackgroundCrawl,
            &long,
            LEASE
        ));
        assert_eq!(
            regulator.collection_activity(&c1),
            CollectionActivity::ContentSetActivity
        );
        let marker = &regulator.snapshot().collections[0];
        assert_eq!(marker.remaining, HOUR);
    }
}
