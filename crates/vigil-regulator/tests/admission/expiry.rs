pub mod expiry {
    //! 租约惰性过期与结束守卫。

    use std::time::Duration;

    use super::{HOUR, regulator_with_clock};
    use vigil_regulator::{CollectionActivity, CollectionRef, ContentSetActivity, ContentSetRef};

    const SHORT: Duration = Duration::from_millis(50);

    #[test]
    fn expired_content_set_lease_no_longer_blocks() {
        let (regulator, clock) = regulator_with_clock();
        let node = ContentSetRef::subtree("C1", "/a");
        assert!(regulator.start_content_set_activity(
            ContentSetActivity::BackgroundCrawl,
            &node,
            SHORT
        ));

        clock.advance(Duration::from_millis(49));
        assert!(!regulator.start_content_set_activity(
            ContentSetActivity::StandardContentPoll,
            &node,
            HOUR
        ));

        clock.advance(Duration::from_millis(1));
        assert!(regulator.start_content_set_activity(
            ContentSetActivity::StandardContentPoll,
            &node,
            HOUR
        ));
    }

    #[test]
    fn expired_collection_lease_no_longer_blocks() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        assert!(regulator.start_collection_activity(CollectionActivity::Treewalk, &c1, SHORT));
        clock.advance(SHORT);
        assert_eq!(regulator.collection_activity(&c1), CollectionActivity::NoActivity);
        assert!(regulator.start_collection_activity(CollectionActivity::NewContentCrawl, &c1, HOUR));
    }

    /// 过期后被他人重新授权的节点，不会被原持有者迟到的结束调用清除。
    #[test]
    fn late_finish_does_not_remove_a_newer_grant() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        let node = ContentSetRef::subtree("C1", "/a");
        assert!(regulator.start_content_set_activity(ContentSetActivity::RepairCrawl, &node, SHORT));

        clock.advance(SHORT);
        assert!(regulator.start_content_set_activity(
            ContentSetActivity::BackgroundCrawl,
            &node,
            HOUR
        ));
        regulator.finish_content_set_activity(ContentSetActivity::RepairCrawl, &node);

        assert_eq!(
            regulator.content_set_activity(&node),
            ContentSetActivity::BackgroundCrawl
        );
        assert_eq!(
            regulator.collection_activity(&c1),
            CollectionActivity::ContentSetActivity
        );
    }

    #[test]
    fn late_collection_finish_does_not_remove_a_newer_grant() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        assert!(regulator.start_collection_activity(CollectionActivity::NewContentCrawl, &c1, SHORT));
        clock.advance(SHORT);
        assert!(regulator.start_collection_activity(CollectionActivity::Treewalk, &c1, HOUR));
        regulator.finish_collection_activity(CollectionActivity::NewContentCrawl, &c1);
        assert_eq!(regulator.collection_activity(&c1), CollectionActivity::Treewalk);
    }

    /// 内容集标记按最近一次授权的租约重装，可能早于更早授权的内容集过期；
    /// 标记过期后集合级活动即可启动。
    #[test]
    fn marker_follows_the_latest_grant_lease() {
        let (regulator, clock) = regulator_with_clock();
        let c1 = CollectionRef::new("C1");
        assert!(regulator.start_content_set_activity(
            ContentSetActivity::BackgroundCrawl,
            &ContentSetRef::subtree("C1", "/long"),
            HOUR
        ));
        assert!(regulator.start_content_set_activity(
            ContentSetActivity::RepairCrawl,
            &ContentSetRef::subtree("C1", "/short"),
            SHORT
        ));
        clock.advance(SHORT);
        assert_eq!(regulator.collection_activity(&c1), CollectionActivity::NoActivity);
    }
}
