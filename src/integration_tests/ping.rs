use super::{with_chans, with_conn};
use crate::{Binding, Ping, Publisher, Receiver};
use amiquip::{
    ConsumerMessage, ConsumerOptions, FieldTable, QueueDeclareOptions, QueueDeleteOptions,
};
use serial_test::serial;
use std::thread;
use std::time::Duration;

fn unique_queue(prefix: &str) -> String {
    format!("amqp-ping-{}-{}", prefix, uuid::Uuid::new_v4())
}

#[test]
#[serial]
fn test_publisher_sends_value_every_interval() {
    with_chans(|listen, publish| {
        let queue = listen
            .queue_declare(
                unique_queue("publisher"),
                QueueDeclareOptions {
                    exclusive: true,
                    ..QueueDeclareOptions::default()
                },
            )
            .unwrap();
        let exchange = listen.exchange_declare_passive(Ping::EXCHANGE).unwrap();
        queue
            .bind(&exchange, Ping::ROUTING_KEY, FieldTable::new())
            .unwrap();
        let consumer = queue
            .consume(ConsumerOptions {
                no_ack: true,
                ..ConsumerOptions::default()
            })
            .unwrap();

        let sent = Publisher::new(publish, Ping::new(7))
            .with_interval(Duration::from_millis(50))
            .publish(Some(3))
            .unwrap();
        assert_eq!(sent, 3);

        for _ in 0..sent {
            match consumer
                .receiver()
                .recv_timeout(Duration::from_secs(5))
                .unwrap()
            {
                ConsumerMessage::Delivery(delivery) => {
                    assert_eq!(delivery.body, b"7");
                    assert_eq!(delivery.routing_key, "ping");
                    assert_eq!(
                        delivery.properties.content_type(),
                        &Some("text/plain".to_string())
                    );
                    assert_eq!(delivery.properties.delivery_mode(), &Some(2));
                    assert!(delivery.properties.timestamp().is_some());
                }
                other => panic!("unexpected consumer message {:?}", other),
            }
        }
    })
}

#[test]
#[serial]
fn test_receiver_prints_and_acks_once() {
    with_chans(|receive, publish| {
        let binding = Binding {
            queue: unique_queue("receiver"),
            ..Binding::default()
        };
        let mut out = Vec::new();

        let handled = thread::scope(|s| {
            let receiver = s.spawn(|| Receiver::new(receive, binding, &mut out).receive(Some(1)));
            // keep publishing until the receiver's queue is bound and has taken one
            let publisher = Publisher::new(publish, Ping::new(42))
                .with_interval(Duration::from_millis(100));
            publisher.publish(Some(20)).unwrap();
            receiver.join().unwrap().unwrap()
        });
        assert_eq!(handled, 1);

        let out = String::from_utf8(out).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Body: 42 Timestamp: "));
        assert!(!lines[0].ends_with("Timestamp: -"));
    })
}

#[test]
#[serial]
fn test_receiver_acks_each_delivery_once() {
    with_conn(|conn| {
        let setup = conn.open_channel(None).unwrap();
        let receive = conn.open_channel(None).unwrap();
        let publish = conn.open_channel(None).unwrap();

        // a queue that outlives the receiver, so unacked messages would still be there
        let binding = Binding {
            queue: unique_queue("ack"),
            auto_delete: false,
            ..Binding::default()
        };
        let queue = setup
            .queue_declare(
                binding.queue.as_str(),
                QueueDeclareOptions {
                    auto_delete: false,
                    ..QueueDeclareOptions::default()
                },
            )
            .unwrap();
        let exchange = setup.exchange_declare_passive(Ping::EXCHANGE).unwrap();
        queue
            .bind(&exchange, binding.pattern.as_str(), FieldTable::new())
            .unwrap();

        let sent = Publisher::new(publish, Ping::new(13))
            .with_interval(Duration::from_millis(10))
            .publish(Some(1))
            .unwrap();
        assert_eq!(sent, 1);

        let mut out = Vec::new();
        let handled = Receiver::new(receive, binding.clone(), &mut out)
            .receive(Some(1))
            .unwrap();
        assert_eq!(handled, 1);
        assert!(String::from_utf8(out).unwrap().starts_with("Body: 13 Timestamp: "));

        // the receiver's channel is closed; anything unacked would have been requeued
        let after = setup.queue_declare_passive(binding.queue.as_str()).unwrap();
        assert_eq!(after.declared_message_count(), Some(0));
        assert!(after.get(false).unwrap().is_none());

        after.delete(QueueDeleteOptions::default()).unwrap();
    })
}
